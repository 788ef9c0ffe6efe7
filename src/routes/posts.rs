use crate::{
    error::Result,
    models::{post::*, response::Listing},
    state::AppState,
    utils::{
        middleware::OptionalAuth,
        pagination::{paginate, PageRequest},
        validation::ValidatedJson,
    },
};
use axum::{
    extract::{OriginalUri, Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/:id",
            get(get_post)
                .put(replace_post)
                .patch(update_post)
                .delete(delete_post),
        )
}

/// 获取帖子列表
/// GET /api/v1/posts?limit=&offset=
///
/// 未提供 limit/offset 时返回完整数组
async fn list_posts(
    State(state): State<Arc<AppState>>,
    OptionalAuth(user): OptionalAuth,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Result<Json<Listing<Post>>> {
    debug!("Listing posts: {}", uri);

    let posts = state.post_service.list_posts(user.as_ref()).await?;
    let page_request = PageRequest::from_parts(&uri, &headers);

    Ok(Json(paginate(posts, &page_request)))
}

/// 发布帖子
/// POST /api/v1/posts
async fn create_post(
    State(state): State<Arc<AppState>>,
    OptionalAuth(user): OptionalAuth,
    ValidatedJson(request): ValidatedJson<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>)> {
    let post = state
        .post_service
        .create_post(user.as_ref(), request)
        .await?;

    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /api/v1/posts/:id
async fn get_post(
    State(state): State<Arc<AppState>>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<String>,
) -> Result<Json<Post>> {
    let post = state.post_service.get_post(user.as_ref(), &id).await?;
    Ok(Json(post))
}

/// 整体替换帖子内容
/// PUT /api/v1/posts/:id
async fn replace_post(
    State(state): State<Arc<AppState>>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<CreatePostRequest>,
) -> Result<Json<Post>> {
    debug!("Replacing post: {}", id);

    let post = state
        .post_service
        .update_post(user.as_ref(), &id, request.into())
        .await?;

    Ok(Json(post))
}

/// 部分更新帖子
/// PATCH /api/v1/posts/:id
async fn update_post(
    State(state): State<Arc<AppState>>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdatePostRequest>,
) -> Result<Json<Post>> {
    debug!("Updating post: {}", id);

    let post = state
        .post_service
        .update_post(user.as_ref(), &id, request)
        .await?;

    Ok(Json(post))
}

/// 删除帖子及其评论
/// DELETE /api/v1/posts/:id
async fn delete_post(
    State(state): State<Arc<AppState>>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.post_service.delete_post(user.as_ref(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
