use crate::{
    error::Result,
    models::user::*,
    services::auth::AuthUser,
    state::AppState,
    utils::validation::ValidatedJson,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tracing::debug;

/// 用户注册与当前用户，挂载在 /auth 下
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", post(register))
        .route("/users/me", get(get_current_user))
}

/// 注册新用户
/// POST /auth/users
async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let user = state.user_service.register(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// 获取当前用户信息
/// GET /auth/users/me
async fn get_current_user(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<User>> {
    debug!("Getting current user info for user: {}", user.id);

    let user = state.user_service.get_current(&user).await?;
    Ok(Json(user))
}
