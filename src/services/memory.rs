use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

use crate::{
    error::{AppError, Result},
    models::{comment::Comment, follow::Follow, group::Group, post::Post, user::User},
    services::repository::Repository,
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    groups: Vec<Group>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    follows: Vec<Follow>,
}

/// 内存存储，检查与写入在同一把写锁内完成
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryStore {
    async fn insert_user(&self, user: User) -> Result<User> {
        let mut tables = self.tables.write();
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(AppError::conflict("A user with that username already exists"));
        }
        tables.users.push(user.clone());
        debug!("Stored user {}", user.username);
        Ok(user)
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        Ok(self.tables.read().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .tables
            .read()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn insert_group(&self, group: Group) -> Result<Group> {
        let mut tables = self.tables.write();
        if tables.groups.iter().any(|g| g.slug == group.slug) {
            return Err(AppError::conflict("A group with that slug already exists"));
        }
        tables.groups.push(group.clone());
        Ok(group)
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        Ok(self.tables.read().groups.clone())
    }

    async fn get_group(&self, id: &str) -> Result<Option<Group>> {
        Ok(self.tables.read().groups.iter().find(|g| g.id == id).cloned())
    }

    async fn insert_post(&self, post: Post) -> Result<Post> {
        self.tables.write().posts.push(post.clone());
        Ok(post)
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        Ok(self.tables.read().posts.clone())
    }

    async fn get_post(&self, id: &str) -> Result<Option<Post>> {
        Ok(self.tables.read().posts.iter().find(|p| p.id == id).cloned())
    }

    async fn update_post(&self, post: Post) -> Result<Post> {
        let mut tables = self.tables.write();
        let slot = tables
            .posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or_else(|| AppError::not_found("Post"))?;
        *slot = post.clone();
        Ok(post)
    }

    async fn delete_post(&self, id: &str) -> Result<()> {
        let mut tables = self.tables.write();
        tables.posts.retain(|p| p.id != id);
        tables.comments.retain(|c| c.post != id);
        Ok(())
    }

    async fn insert_comment(&self, comment: Comment) -> Result<Comment> {
        let mut tables = self.tables.write();
        if !tables.posts.iter().any(|p| p.id == comment.post) {
            return Err(AppError::not_found("Post"));
        }
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>> {
        Ok(self
            .tables
            .read()
            .comments
            .iter()
            .filter(|c| c.post == post_id)
            .cloned()
            .collect())
    }

    async fn get_comment(&self, post_id: &str, id: &str) -> Result<Option<Comment>> {
        Ok(self
            .tables
            .read()
            .comments
            .iter()
            .find(|c| c.id == id && c.post == post_id)
            .cloned())
    }

    async fn update_comment(&self, comment: Comment) -> Result<Comment> {
        let mut tables = self.tables.write();
        let slot = tables
            .comments
            .iter_mut()
            .find(|c| c.id == comment.id)
            .ok_or_else(|| AppError::not_found("Comment"))?;
        *slot = comment.clone();
        Ok(comment)
    }

    async fn delete_comment(&self, id: &str) -> Result<()> {
        self.tables.write().comments.retain(|c| c.id != id);
        Ok(())
    }

    async fn insert_follow(&self, follow: Follow) -> Result<Follow> {
        let mut tables = self.tables.write();
        if tables
            .follows
            .iter()
            .any(|f| f.user == follow.user && f.following == follow.following)
        {
            return Err(AppError::conflict("Follow edge already exists"));
        }
        tables.follows.push(follow.clone());
        Ok(follow)
    }

    async fn list_follows(&self, username: &str) -> Result<Vec<Follow>> {
        Ok(self
            .tables
            .read()
            .follows
            .iter()
            .filter(|f| f.user == username)
            .cloned()
            .collect())
    }

    async fn follow_exists(&self, username: &str, following: &str) -> Result<bool> {
        Ok(self
            .tables
            .read()
            .follows
            .iter()
            .any(|f| f.user == username && f.following == following))
    }
}
