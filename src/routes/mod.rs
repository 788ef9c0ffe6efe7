pub mod auth;
pub mod comments;
pub mod follows;
pub mod groups;
pub mod posts;
pub mod users;

use crate::state::AppState;
use axum::Router;
use std::sync::Arc;

/// 挂载在 /api/v1 下的全部资源路由
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(posts::router())
        .merge(comments::router())
        .merge(groups::router())
        .merge(follows::router())
        .merge(auth::router())
}
