use crate::{
    error::{AppError, Result},
    models::post::*,
    services::{auth::AuthUser, repository::Repository},
    utils::permissions::{Access, Policy},
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct PostService {
    db: Arc<dyn Repository>,
    policy: Policy,
}

impl PostService {
    pub fn new(db: Arc<dyn Repository>) -> Self {
        Self {
            db,
            policy: Policy::author_or_read_only(),
        }
    }

    async fn ensure_group_exists(&self, group: Option<&str>) -> Result<()> {
        if let Some(group_id) = group {
            if self.db.get_group(group_id).await?.is_none() {
                return Err(AppError::Validation(format!(
                    "Invalid group \"{}\" - object does not exist",
                    group_id
                )));
            }
        }
        Ok(())
    }

    async fn fetch(&self, post_id: &str) -> Result<Post> {
        self.db
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::not_found("Post"))
    }

    pub async fn list_posts(&self, user: Option<&AuthUser>) -> Result<Vec<Post>> {
        self.policy.check(user, Access::Safe)?;
        self.db.list_posts().await
    }

    pub async fn get_post(&self, user: Option<&AuthUser>, post_id: &str) -> Result<Post> {
        self.policy.check(user, Access::Safe)?;
        let post = self.fetch(post_id).await?;
        self.policy.check_object(user, Access::Safe, &post)?;
        Ok(post)
    }

    pub async fn create_post(
        &self,
        user: Option<&AuthUser>,
        request: CreatePostRequest,
    ) -> Result<Post> {
        self.policy.check(user, Access::Unsafe)?;
        let author = user.ok_or_else(|| AppError::unauthorized("Authentication required"))?;
        self.ensure_group_exists(request.group.as_deref()).await?;

        let post = Post {
            id: Uuid::new_v4().to_string(),
            text: request.text,
            pub_date: Utc::now(),
            author: author.username.clone(),
            group: request.group,
            image: request.image,
        };

        let post = self.db.insert_post(post).await?;
        info!("Created post: {} by user: {}", post.id, post.author);
        Ok(post)
    }

    /// PUT 传入由完整请求转换的更新，PATCH 传入部分更新
    pub async fn update_post(
        &self,
        user: Option<&AuthUser>,
        post_id: &str,
        update: UpdatePostRequest,
    ) -> Result<Post> {
        self.policy.check(user, Access::Unsafe)?;
        let mut post = self.fetch(post_id).await?;
        self.policy.check_object(user, Access::Unsafe, &post)?;

        if let Some(group) = &update.group {
            self.ensure_group_exists(group.as_deref()).await?;
        }

        post.apply(update);
        let post = self.db.update_post(post).await?;
        info!("Updated post: {}", post.id);
        Ok(post)
    }

    pub async fn delete_post(&self, user: Option<&AuthUser>, post_id: &str) -> Result<()> {
        self.policy.check(user, Access::Unsafe)?;
        let post = self.fetch(post_id).await?;
        self.policy.check_object(user, Access::Unsafe, &post)?;

        debug!("Deleting post {} and its comments", post_id);
        self.db.delete_post(post_id).await?;
        info!("Deleted post: {}", post_id);
        Ok(())
    }
}
