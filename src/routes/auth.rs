use crate::{
    error::Result,
    models::user::*,
    services::auth::TokenPair,
    state::AppState,
    utils::validation::ValidatedJson,
};
use axum::{extract::State, response::Json, routing::post, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// JWT 令牌接口，挂载在 /api/v1/jwt 下
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/jwt/create", post(create_token))
        .route("/jwt/refresh", post(refresh_token))
        .route("/jwt/verify", post(verify_token))
}

/// 用户名密码换取令牌
/// POST /api/v1/jwt/create
async fn create_token(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<TokenObtainRequest>,
) -> Result<Json<TokenPair>> {
    debug!("Issuing tokens for user: {}", request.username);

    let tokens = state
        .user_service
        .obtain_tokens(&request.username, &request.password)
        .await?;

    info!("Issued tokens for user: {}", request.username);
    Ok(Json(tokens))
}

/// POST /api/v1/jwt/refresh
async fn refresh_token(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<TokenRefreshRequest>,
) -> Result<Json<AccessToken>> {
    let access = state.auth_service.refresh_access(&request.refresh)?;
    Ok(Json(AccessToken { access }))
}

/// 校验任意类型的令牌，成功时返回空对象
/// POST /api/v1/jwt/verify
async fn verify_token(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<TokenVerifyRequest>,
) -> Result<Json<Value>> {
    state.auth_service.verify_jwt(&request.token)?;
    Ok(Json(json!({})))
}
