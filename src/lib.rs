pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use tower::Layer;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    normalize_path::{NormalizePath, NormalizePathLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::{config::Config, state::AppState, utils::middleware::auth_middleware};

/// 完整的 HTTP 应用，末尾斜杠在路由匹配前被去除
pub type App = NormalizePath<Router>;

pub fn build_app(app_state: Arc<AppState>) -> App {
    let cors = cors_layer(&app_state.config);

    let router = Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_router())
        .nest("/auth", routes::users::router())
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins = config
        .cors_allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_origin(origins)
}

async fn health_check() -> &'static str {
    "yatube-api is running!"
}
