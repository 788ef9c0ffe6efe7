use crate::{
    error::Result,
    models::comment::*,
    state::AppState,
    utils::{middleware::OptionalAuth, validation::ValidatedJson},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/posts/:post_id/comments",
            get(list_comments).post(create_comment),
        )
        .route(
            "/posts/:post_id/comments/:id",
            get(get_comment)
                .put(replace_comment)
                .patch(update_comment)
                .delete(delete_comment),
        )
}

/// 获取帖子下的评论
/// GET /api/v1/posts/:post_id/comments
async fn list_comments(
    State(state): State<Arc<AppState>>,
    OptionalAuth(user): OptionalAuth,
    Path(post_id): Path<String>,
) -> Result<Json<Vec<Comment>>> {
    let comments = state
        .comment_service
        .get_post_comments(user.as_ref(), &post_id)
        .await?;

    Ok(Json(comments))
}

/// 发表评论
/// POST /api/v1/posts/:post_id/comments
async fn create_comment(
    State(state): State<Arc<AppState>>,
    OptionalAuth(user): OptionalAuth,
    Path(post_id): Path<String>,
    ValidatedJson(request): ValidatedJson<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>)> {
    let comment = state
        .comment_service
        .create_comment(user.as_ref(), &post_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

async fn get_comment(
    State(state): State<Arc<AppState>>,
    OptionalAuth(user): OptionalAuth,
    Path((post_id, id)): Path<(String, String)>,
) -> Result<Json<Comment>> {
    let comment = state
        .comment_service
        .get_comment(user.as_ref(), &post_id, &id)
        .await?;

    Ok(Json(comment))
}

/// PUT /api/v1/posts/:post_id/comments/:id
async fn replace_comment(
    State(state): State<Arc<AppState>>,
    OptionalAuth(user): OptionalAuth,
    Path((post_id, id)): Path<(String, String)>,
    ValidatedJson(request): ValidatedJson<CreateCommentRequest>,
) -> Result<Json<Comment>> {
    debug!("Replacing comment {} on post {}", id, post_id);

    let comment = state
        .comment_service
        .update_comment(user.as_ref(), &post_id, &id, request.into())
        .await?;

    Ok(Json(comment))
}

/// PATCH /api/v1/posts/:post_id/comments/:id
async fn update_comment(
    State(state): State<Arc<AppState>>,
    OptionalAuth(user): OptionalAuth,
    Path((post_id, id)): Path<(String, String)>,
    ValidatedJson(request): ValidatedJson<UpdateCommentRequest>,
) -> Result<Json<Comment>> {
    debug!("Updating comment {} on post {}", id, post_id);

    let comment = state
        .comment_service
        .update_comment(user.as_ref(), &post_id, &id, request)
        .await?;

    Ok(Json(comment))
}

/// DELETE /api/v1/posts/:post_id/comments/:id
async fn delete_comment(
    State(state): State<Arc<AppState>>,
    OptionalAuth(user): OptionalAuth,
    Path((post_id, id)): Path<(String, String)>,
) -> Result<StatusCode> {
    state
        .comment_service
        .delete_comment(user.as_ref(), &post_id, &id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
