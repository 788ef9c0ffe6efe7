use std::sync::Arc;

use crate::{
    config::Config,
    error::Result,
    services::{
        auth::AuthService,
        comment::CommentService,
        follow::FollowService,
        group::GroupService,
        post::PostService,
        repository::Repository,
        user::UserService,
    },
};

/// 应用程序的共享状态
/// 包含所有服务和配置的引用
#[derive(Clone)]
pub struct AppState {
    /// 应用配置
    pub config: Config,

    /// 认证服务
    pub auth_service: AuthService,

    /// 用户服务
    pub user_service: UserService,

    /// 帖子服务
    pub post_service: PostService,

    /// 分组服务
    pub group_service: GroupService,

    /// 评论服务
    pub comment_service: CommentService,

    /// 关注服务
    pub follow_service: FollowService,
}

impl AppState {
    /// 基于任意存储实现组装全部服务
    pub fn new(config: Config, db: Arc<dyn Repository>) -> Result<Self> {
        let auth_service = AuthService::new(&config)?;

        Ok(Self {
            user_service: UserService::new(db.clone(), auth_service.clone()),
            post_service: PostService::new(db.clone()),
            group_service: GroupService::new(db.clone()),
            comment_service: CommentService::new(db.clone()),
            follow_service: FollowService::new(db),
            auth_service,
            config,
        })
    }

    /// 检查是否为生产环境
    pub fn is_production(&self) -> bool {
        self.config.is_production()
    }
}
