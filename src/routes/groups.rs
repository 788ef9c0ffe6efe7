use crate::{error::Result, models::group::Group, state::AppState};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use std::sync::Arc;

/// 分组只读，写入通过启动时的 fixture 完成
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/groups", get(list_groups))
        .route("/groups/:id", get(get_group))
}

async fn list_groups(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Group>>> {
    let groups = state.group_service.list_groups().await?;
    Ok(Json(groups))
}

async fn get_group(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Group>> {
    let group = state.group_service.get_group(&id).await?;
    Ok(Json(group))
}
