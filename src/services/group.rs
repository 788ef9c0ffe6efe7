use crate::{
    error::{AppError, Result},
    models::group::*,
    services::repository::Repository,
};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// 分组服务，接口只读，数据来自 fixture
#[derive(Clone)]
pub struct GroupService {
    db: Arc<dyn Repository>,
}

impl GroupService {
    pub fn new(db: Arc<dyn Repository>) -> Self {
        Self { db }
    }

    pub async fn list_groups(&self) -> Result<Vec<Group>> {
        self.db.list_groups().await
    }

    pub async fn get_group(&self, group_id: &str) -> Result<Group> {
        self.db
            .get_group(group_id)
            .await?
            .ok_or_else(|| AppError::not_found("Group"))
    }

    /// 从 JSON 数组载入分组，已存在的 slug 跳过
    pub async fn load_fixture(&self, json: &str) -> Result<usize> {
        let fixtures: Vec<GroupFixture> = serde_json::from_str(json)?;
        let mut loaded = 0;

        for fixture in fixtures {
            let group = Group {
                id: Uuid::new_v4().to_string(),
                title: fixture.title,
                slug: fixture.slug,
                description: fixture.description,
            };
            match self.db.insert_group(group).await {
                Ok(group) => {
                    debug!("Loaded group {}", group.slug);
                    loaded += 1;
                }
                Err(AppError::Conflict(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        info!("Loaded {} groups from fixture", loaded);
        Ok(loaded)
    }
}
