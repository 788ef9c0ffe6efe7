use crate::{error::AppError, services::auth::AuthUser, state::AppState};
use axum::{
    body::Body,
    extract::State,
    headers::{authorization::Bearer, Authorization},
    http::Request,
    middleware::Next,
    response::Response,
    TypedHeader,
};
use std::sync::Arc;
use tracing::debug;

/// 认证中间件
///
/// 有效的 access 令牌会把 `AuthUser` 写入请求扩展；缺失或无效的令牌
/// 不会中断请求，由各接口的权限策略决定是否拒绝。
pub async fn auth_middleware(
    State(app_state): State<Arc<AppState>>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request<Body>,
    next: Next<Body>,
) -> Response {
    if let Some(TypedHeader(Authorization(bearer))) = bearer {
        match app_state.auth_service.authenticate(bearer.token()) {
            Ok(user) => {
                debug!("Authenticated user: {} ({})", user.username, user.id);
                request.extensions_mut().insert(user);
            }
            Err(e) => {
                debug!("Bearer token rejected: {}", e);
            }
        }
    }

    next.run(request).await
}

/// 可选认证提取器
pub struct OptionalAuth(pub Option<AuthUser>);

#[async_trait::async_trait]
impl<S> axum::extract::FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts.extensions.get::<AuthUser>().cloned();
        Ok(OptionalAuth(user))
    }
}
