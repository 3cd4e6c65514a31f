use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Client;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::Value;
use tempfile::TempDir;

use common::storage::naming::{object_key, public_object_url};
use common::storage::{FileStore, StagedFile, StorageError};
use modelvault::config::{
    AdminSeedConfig, AppConfig, AuthConfig, CorsConfig, DatabaseConfig, ServerConfig,
    StorageAppConfig,
};
use modelvault::database::create_tables;
use modelvault::state::AppState;
use modelvault::storage::build_file_store;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const EMBED_BASE_URL: &str = "http://frontend.test";
pub const PUBLIC_BASE_URL: &str = "http://backend.test";
pub const CDN_BASE: &str = "https://cdn.test";

pub mod routes {
    pub const REGISTER: &str = "/api/users";
    pub const LOGIN: &str = "/api/users/login";
    pub const PROFILE: &str = "/api/users/profile";
    pub const REQUESTS: &str = "/api/requests";
    pub const ALL_REQUESTS: &str = "/api/requests/all";
    pub const HEALTH: &str = "/api/health";

    pub fn request(id: i32) -> String {
        format!("/api/requests/{id}")
    }

    pub fn request_status(id: i32) -> String {
        format!("/api/requests/{id}/status")
    }

    pub fn upload(request_id: i32) -> String {
        format!("/api/models/upload/{request_id}")
    }

    pub fn model(id: &str) -> String {
        format!("/api/models/{id}")
    }

    pub fn embed_code(id: &str) -> String {
        format!("/api/models/{id}/embed-code")
    }

    pub fn public_model(id: &str) -> String {
        format!("/api/models/embed/{id}")
    }

    pub fn viewer(id: &str) -> String {
        format!("/embed/{id}")
    }
}

/// Stand-in for an S3 bucket: keeps objects in memory, keyed like the real store.
#[derive(Default)]
pub struct RecordingRemoteStore {
    pub objects: Mutex<HashMap<String, Vec<u8>>>,
    pub puts: Mutex<Vec<String>>,
    pub fail: AtomicBool,
}

impl RecordingRemoteStore {
    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn put_count(&self) -> usize {
        self.puts.lock().unwrap().len()
    }
}

#[async_trait]
impl FileStore for RecordingRemoteStore {
    async fn store(&self, file: &StagedFile, user_id: i32) -> Result<String, StorageError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::Remote("PUT returned HTTP 503".into()));
        }
        let content = tokio::fs::read(&file.path).await?;
        let key = object_key(user_id, &file.original_name);
        self.puts.lock().unwrap().push(key.clone());
        self.objects.lock().unwrap().insert(key.clone(), content);
        Ok(public_object_url(
            Some(CDN_BASE),
            "models-bucket",
            "us-east-1",
            None,
            &key,
        ))
    }

    fn is_remote(&self) -> bool {
        true
    }
}

/// A running test server.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub upload_dir: PathBuf,
    pub staging_dir: PathBuf,
    _scratch: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
    pub content_type: Option<String>,
}

/// One multipart file part.
pub struct FilePart {
    pub field: &'static str,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl FilePart {
    pub fn new(field: &'static str, file_name: &str, bytes: &[u8]) -> Self {
        Self {
            field,
            file_name: file_name.to_string(),
            bytes: bytes.to_vec(),
        }
    }
}

/// The canonical GLB + USDZ pair.
pub fn model_pair() -> Vec<FilePart> {
    vec![
        FilePart::new("glbFile", "primary.glb", b"glTF-binary-bytes"),
        FilePart::new("usdzFile", "secondary.usdz", b"usdz-zip-bytes"),
    ]
}

fn test_config(scratch: &Path, storage: StorageAppConfig) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            public_base_url: PUBLIC_BASE_URL.to_string(),
            embed_base_url: EMBED_BASE_URL.to_string(),
            cors: CorsConfig {
                allow_origins: vec![],
                max_age: 3600,
            },
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        auth: AuthConfig {
            jwt_secret: "test-secret-for-integration-tests".to_string(),
            token_ttl_days: 30,
        },
        storage: StorageAppConfig {
            upload_dir: scratch.join("uploads"),
            staging_dir: scratch.join("staging"),
            ..storage
        },
        admin: Some(AdminSeedConfig {
            name: "Admin User".to_string(),
            email: ADMIN_EMAIL.to_string(),
            password: ADMIN_PASSWORD.to_string(),
        }),
    }
}

impl TestApp {
    /// Server backed by local disk storage.
    pub async fn spawn() -> Self {
        Self::spawn_with(StorageAppConfig::default(), None).await
    }

    /// Server with a custom storage configuration, still on local disk.
    pub async fn spawn_with_storage(storage: StorageAppConfig) -> Self {
        Self::spawn_with(storage, None).await
    }

    /// Server whose uploads go to `store` instead of local disk.
    pub async fn spawn_with_store(store: Arc<dyn FileStore>) -> Self {
        Self::spawn_with(StorageAppConfig::default(), Some(store)).await
    }

    async fn spawn_with(storage: StorageAppConfig, store: Option<Arc<dyn FileStore>>) -> Self {
        let scratch = tempfile::tempdir().expect("Failed to create scratch dir");
        let config = test_config(scratch.path(), storage);
        std::fs::create_dir_all(&config.storage.staging_dir).expect("Failed to create staging dir");

        let mut opts = ConnectOptions::new(config.database.url.clone());
        opts.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(opts)
            .await
            .expect("Failed to connect to in-memory database");
        create_tables(&db).await.expect("Failed to create tables");

        if let Some(admin) = &config.admin {
            modelvault::seed::seed_admin(&db, admin)
                .await
                .expect("Failed to seed admin");
        }

        let file_store = match store {
            Some(store) => store,
            None => build_file_store(&config.storage)
                .await
                .expect("Failed to build local file store"),
        };

        let upload_dir = config.storage.upload_dir.clone();
        let staging_dir = config.storage.staging_dir.clone();
        let state = AppState {
            config,
            db: db.clone(),
            file_store,
        };

        let app = modelvault::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            upload_dir,
            staging_dir,
            _scratch: scratch,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn post_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn post_without_token(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn get_with_token(&self, path: &str, token: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn get_without_token(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn put_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        let res = self
            .client
            .put(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await
            .expect("Failed to send PUT request");

        TestResponse::from_response(res).await
    }

    /// Multipart POST to the model upload route.
    pub async fn upload_model(
        &self,
        request_id: i32,
        parts: Vec<FilePart>,
        token: &str,
    ) -> TestResponse {
        let mut form = reqwest::multipart::Form::new();
        for part in parts {
            let file = reqwest::multipart::Part::bytes(part.bytes)
                .file_name(part.file_name)
                .mime_str("application/octet-stream")
                .expect("Failed to set MIME type");
            form = form.part(part.field, file);
        }

        let res = self
            .client
            .post(self.url(&routes::upload(request_id)))
            .header("Authorization", format!("Bearer {token}"))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart upload request");

        TestResponse::from_response(res).await
    }

    /// Register a user, returning `(user_id, token)`.
    pub async fn register_user(&self, name: &str, email: &str) -> (i32, String) {
        let res = self
            .post_without_token(
                routes::REGISTER,
                &serde_json::json!({
                    "name": name,
                    "email": email,
                    "password": "password123",
                }),
            )
            .await;
        assert_eq!(res.status, 201, "Registration failed: {}", res.text);

        let token = res.body["token"]
            .as_str()
            .expect("Registration response should contain a token")
            .to_string();
        (res.id(), token)
    }

    /// Log in as the seeded administrator.
    pub async fn admin_token(&self) -> String {
        let res = self
            .post_without_token(
                routes::LOGIN,
                &serde_json::json!({
                    "email": ADMIN_EMAIL,
                    "password": ADMIN_PASSWORD,
                }),
            )
            .await;
        assert_eq!(res.status, 200, "Admin login failed: {}", res.text);

        res.body["token"]
            .as_str()
            .expect("Login response should contain a token")
            .to_string()
    }

    /// Create a request via the API and return its `id`.
    pub async fn create_request(&self, token: &str, title: &str) -> i32 {
        let res = self
            .post_with_token(
                routes::REQUESTS,
                &serde_json::json!({
                    "title": title,
                    "description": "A lounge chair for the product page",
                    "specifications": "80x75x90 cm, walnut",
                    "additionalNotes": "Needs AR",
                }),
                token,
            )
            .await;
        assert_eq!(res.status, 201, "create_request failed: {}", res.text);
        res.id()
    }

    /// Names of files stored locally for `user_id`, sorted.
    pub fn stored_files(&self, user_id: i32) -> Vec<String> {
        let dir = self.upload_dir.join(user_id.to_string());
        let mut names: Vec<String> = match std::fs::read_dir(&dir) {
            Ok(entries) => entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }

    /// Number of temp files left in the staging directory.
    pub fn staged_file_count(&self) -> usize {
        std::fs::read_dir(&self.staging_dir)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let content_type = res
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self {
            status,
            text,
            body,
            content_type,
        }
    }

    pub fn id(&self) -> i32 {
        self.body["id"]
            .as_i64()
            .expect("response body should contain 'id'") as i32
    }
}
