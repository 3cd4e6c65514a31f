use std::path::Path;

use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;

/// Result of validating a flat filename.
#[derive(Debug, PartialEq, Eq)]
pub enum FilenameError {
    /// Filename is empty or whitespace-only.
    Empty,
    /// Filename contains path separators (`/` or `\`).
    ContainsPathSeparator,
    /// Filename is `..`.
    PathTraversal,
    /// Filename starts with a dot (hidden file).
    Hidden,
    /// Filename contains control characters, including NUL.
    ControlCharacter,
}

impl FilenameError {
    /// Returns a human-readable error message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "Filename cannot be empty",
            Self::ContainsPathSeparator => "Invalid filename: path separators are not allowed",
            Self::PathTraversal => "Invalid filename: '..' is not allowed",
            Self::Hidden => "Invalid filename: hidden files (starting with '.') are not allowed",
            Self::ControlCharacter => "Invalid filename: control characters are not allowed",
        }
    }
}

/// Validates a client-supplied filename that will become part of a storage path.
pub fn validate_flat_filename(filename: &str) -> Result<&str, FilenameError> {
    let trimmed = filename.trim();

    if trimmed.is_empty() {
        return Err(FilenameError::Empty);
    }

    if trimmed.chars().any(|c| c.is_control()) {
        return Err(FilenameError::ControlCharacter);
    }

    if trimmed.contains('/') || trimmed.contains('\\') {
        return Err(FilenameError::ContainsPathSeparator);
    }

    if trimmed == ".." {
        return Err(FilenameError::PathTraversal);
    }

    if trimmed.starts_with('.') {
        return Err(FilenameError::Hidden);
    }

    Ok(trimmed)
}

/// Lower-cased extension of `filename`, without the dot.
pub fn file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Object key for a remote upload. Deterministic, so re-uploading the same
/// filename for the same user overwrites the previous object.
pub fn object_key(user_id: i32, filename: &str) -> String {
    format!("models/{user_id}/{filename}")
}

/// Public address of an object once uploaded.
///
/// A CDN base wins over the bucket's own address. Without one, custom
/// endpoints use path-style URLs and AWS uses the virtual-hosted form.
pub fn public_object_url(
    cdn_base: Option<&str>,
    bucket: &str,
    region: &str,
    endpoint: Option<&str>,
    key: &str,
) -> String {
    let key = encode_url_path(key);
    match (cdn_base, endpoint) {
        (Some(cdn), _) => format!("{}/{key}", cdn.trim_end_matches('/')),
        (None, Some(endpoint)) => format!("{}/{bucket}/{key}", endpoint.trim_end_matches('/')),
        (None, None) => format!("https://{bucket}.s3.{region}.amazonaws.com/{key}"),
    }
}

/// Percent-encode each `/`-separated segment so names containing `#`, `?`,
/// `%` or spaces stay inside the URL path.
pub fn encode_url_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Collision-resistant local filename: `{unix_millis}-{random}-{filename}`.
pub fn timestamped_name(filename: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        suffix.to_ascii_lowercase(),
        filename
    )
}

/// Best-effort MIME type for a filename when the client did not declare one.
pub fn guess_content_type(filename: &str) -> String {
    match file_extension(filename).as_deref() {
        Some("glb") => "model/gltf-binary".to_string(),
        Some("usdz") => "model/vnd.usdz+zip".to_string(),
        _ => mime_guess::from_path(filename)
            .first()
            .map(|m| m.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string()),
    }
}
