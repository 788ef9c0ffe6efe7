use crate::{
    error::{AppError, Result},
    models::user::*,
    services::{
        auth::{AuthService, AuthUser, TokenPair},
        repository::Repository,
    },
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

const DUPLICATE_USERNAME: &str = "A user with that username already exists";

/// 用户服务，处理注册、登录与用户查询
#[derive(Clone)]
pub struct UserService {
    db: Arc<dyn Repository>,
    auth: AuthService,
}

impl UserService {
    pub fn new(db: Arc<dyn Repository>, auth: AuthService) -> Self {
        Self { db, auth }
    }

    /// 注册新用户
    pub async fn register(&self, request: RegisterRequest) -> Result<User> {
        debug!("Registering user: {}", request.username);

        if self.db.find_user_by_username(&request.username).await?.is_some() {
            return Err(AppError::validation(DUPLICATE_USERNAME));
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            username: request.username,
            email: request.email.unwrap_or_default(),
            first_name: request.first_name.unwrap_or_default(),
            last_name: request.last_name.unwrap_or_default(),
            password_hash: self.auth.hash_password(&request.password)?,
            date_joined: Utc::now(),
        };

        // 并发注册同名用户时由存储层唯一约束兜底
        let user = self.db.insert_user(user).await.map_err(|e| match e {
            AppError::Conflict(_) => AppError::validation(DUPLICATE_USERNAME),
            other => other,
        })?;

        info!("Registered user {}", user.username);
        Ok(user)
    }

    /// 用户名密码换取 access/refresh 令牌
    pub async fn obtain_tokens(&self, username: &str, password: &str) -> Result<TokenPair> {
        let user = self
            .db
            .find_user_by_username(username)
            .await?
            .filter(|user| self.auth.verify_password(password, &user.password_hash))
            .ok_or_else(|| {
                debug!("Rejected credentials for {}", username);
                AppError::unauthorized("No active account found with the given credentials")
            })?;

        self.auth.issue_tokens(&AuthUser::from(&user))
    }

    pub async fn get_current(&self, identity: &AuthUser) -> Result<User> {
        self.db
            .get_user(&identity.id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }
}
