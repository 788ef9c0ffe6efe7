use async_trait::async_trait;

use crate::{
    error::Result,
    models::{comment::Comment, follow::Follow, group::Group, post::Post, user::User},
};

/// 所有服务共用的存储接口
///
/// 实现必须自行保证唯一性：重复的用户名、分组 slug 或 `(user, following)`
/// 关注关系返回 `AppError::Conflict`，并发请求同时通过服务层检查时也一样。
#[async_trait]
pub trait Repository: Send + Sync {
    async fn insert_user(&self, user: User) -> Result<User>;
    async fn get_user(&self, id: &str) -> Result<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn insert_group(&self, group: Group) -> Result<Group>;
    async fn list_groups(&self) -> Result<Vec<Group>>;
    async fn get_group(&self, id: &str) -> Result<Option<Group>>;

    async fn insert_post(&self, post: Post) -> Result<Post>;
    /// 按发布时间顺序返回
    async fn list_posts(&self) -> Result<Vec<Post>>;
    async fn get_post(&self, id: &str) -> Result<Option<Post>>;
    async fn update_post(&self, post: Post) -> Result<Post>;
    /// 删除帖子及其全部评论
    async fn delete_post(&self, id: &str) -> Result<()>;

    async fn insert_comment(&self, comment: Comment) -> Result<Comment>;
    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>>;
    async fn get_comment(&self, post_id: &str, id: &str) -> Result<Option<Comment>>;
    async fn update_comment(&self, comment: Comment) -> Result<Comment>;
    async fn delete_comment(&self, id: &str) -> Result<()>;

    async fn insert_follow(&self, follow: Follow) -> Result<Follow>;
    /// `username` 发起的关注关系，按创建顺序
    async fn list_follows(&self, username: &str) -> Result<Vec<Follow>>;
    async fn follow_exists(&self, username: &str, following: &str) -> Result<bool>;
}
