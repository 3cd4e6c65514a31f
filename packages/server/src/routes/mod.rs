use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

/// Everything mounted under `/api`.
pub fn api_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/users", user_routes())
        .nest("/requests", request_routes())
        .nest("/models", model_routes(config))
        .routes(routes!(handlers::health::health))
}

/// Viewer pages, mounted at the site root.
pub fn embed_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::embed::view_model))
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::user::register))
        .routes(routes!(handlers::user::login))
        .routes(routes!(handlers::user::profile))
}

fn request_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::request::create_request,
            handlers::request::list_my_requests
        ))
        .routes(routes!(handlers::request::list_all_requests))
        .routes(routes!(handlers::request::get_request))
        .routes(routes!(handlers::request::update_request_status))
}

fn model_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let upload = OpenApiRouter::new()
        .routes(routes!(handlers::model::upload_model_files))
        .layer(handlers::model::upload_body_limit(&config.storage));

    OpenApiRouter::new()
        .routes(routes!(handlers::model::get_public_model_data))
        .routes(routes!(handlers::model::get_model))
        .routes(routes!(handlers::model::get_embed_code))
        .merge(upload)
}
