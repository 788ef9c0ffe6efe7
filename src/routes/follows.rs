use crate::{
    error::Result,
    models::follow::*,
    state::AppState,
    utils::{middleware::OptionalAuth, validation::ValidatedJson},
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/follow", get(get_following).post(follow_user))
}

/// 获取当前用户的关注列表
/// GET /api/v1/follow?search=
async fn get_following(
    State(state): State<Arc<AppState>>,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<FollowQuery>,
) -> Result<Json<Vec<Follow>>> {
    debug!("Fetching following with query: {:?}", query);

    let follows = state
        .follow_service
        .get_following(user.as_ref(), query.search.as_deref())
        .await?;

    Ok(Json(follows))
}

/// 关注用户
/// POST /api/v1/follow
async fn follow_user(
    State(state): State<Arc<AppState>>,
    OptionalAuth(user): OptionalAuth,
    ValidatedJson(request): ValidatedJson<CreateFollowRequest>,
) -> Result<(StatusCode, Json<Follow>)> {
    let follow = state
        .follow_service
        .follow_user(user.as_ref(), request)
        .await?;

    Ok((StatusCode::CREATED, Json(follow)))
}
