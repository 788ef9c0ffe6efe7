use crate::{
    error::{AppError, Result},
    models::comment::*,
    services::{auth::AuthUser, repository::Repository},
    utils::permissions::{Access, Policy},
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// 评论服务，评论始终归属于 URL 路径中的帖子
#[derive(Clone)]
pub struct CommentService {
    db: Arc<dyn Repository>,
    policy: Policy,
}

impl CommentService {
    pub fn new(db: Arc<dyn Repository>) -> Self {
        Self {
            db,
            policy: Policy::author_or_read_only(),
        }
    }

    async fn fetch(&self, post_id: &str, comment_id: &str) -> Result<Comment> {
        self.db
            .get_comment(post_id, comment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Comment"))
    }

    pub async fn get_post_comments(
        &self,
        user: Option<&AuthUser>,
        post_id: &str,
    ) -> Result<Vec<Comment>> {
        debug!("Getting comments for post: {}", post_id);
        self.policy.check(user, Access::Safe)?;
        self.db.list_comments(post_id).await
    }

    pub async fn get_comment(
        &self,
        user: Option<&AuthUser>,
        post_id: &str,
        comment_id: &str,
    ) -> Result<Comment> {
        self.policy.check(user, Access::Safe)?;
        self.fetch(post_id, comment_id).await
    }

    pub async fn create_comment(
        &self,
        user: Option<&AuthUser>,
        post_id: &str,
        request: CreateCommentRequest,
    ) -> Result<Comment> {
        debug!("Creating comment for post: {}", post_id);
        self.policy.check(user, Access::Unsafe)?;
        let author = user.ok_or_else(|| AppError::unauthorized("Authentication required"))?;

        let post = self
            .db
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::not_found("Post"))?;

        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            author: author.username.clone(),
            post: post.id,
            text: request.text,
            created: Utc::now(),
        };

        let created = self.db.insert_comment(comment).await?;
        info!("Created comment {} on post {}", created.id, created.post);
        Ok(created)
    }

    pub async fn update_comment(
        &self,
        user: Option<&AuthUser>,
        post_id: &str,
        comment_id: &str,
        request: UpdateCommentRequest,
    ) -> Result<Comment> {
        self.policy.check(user, Access::Unsafe)?;
        let mut comment = self.fetch(post_id, comment_id).await?;
        self.policy.check_object(user, Access::Unsafe, &comment)?;

        if let Some(text) = request.text {
            comment.text = text;
        }

        self.db.update_comment(comment).await
    }

    pub async fn delete_comment(
        &self,
        user: Option<&AuthUser>,
        post_id: &str,
        comment_id: &str,
    ) -> Result<()> {
        self.policy.check(user, Access::Unsafe)?;
        let comment = self.fetch(post_id, comment_id).await?;
        self.policy.check_object(user, Access::Unsafe, &comment)?;

        self.db.delete_comment(&comment.id).await?;
        info!("Deleted comment {} on post {}", comment.id, post_id);
        Ok(())
    }
}
