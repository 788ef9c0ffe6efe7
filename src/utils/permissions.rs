//! 请求级与对象级权限检查
//!
//! [`Policy`] 是按顺序执行的 [`Permission`] 列表，第一个拒绝的权限决定结果：
//! 匿名用户返回 401，其他用户返回 403。

use std::sync::Arc;
use tracing::debug;

use crate::{
    error::{AppError, Result},
    services::auth::AuthUser,
};

/// 请求的操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// 列表 / 详情
    Safe,
    /// 创建 / 更新 / 删除
    Unsafe,
}

impl Access {
    pub fn is_safe(self) -> bool {
        self == Access::Safe
    }
}

/// 归属于单个用户的资源
pub trait Authored {
    fn author(&self) -> &str;
}

pub trait Permission: Send + Sync {
    fn name(&self) -> &'static str;

    fn has_permission(&self, _user: Option<&AuthUser>, _access: Access) -> bool {
        true
    }

    fn has_object_permission(
        &self,
        _user: Option<&AuthUser>,
        _access: Access,
        _object: &dyn Authored,
    ) -> bool {
        true
    }
}

/// 所有操作都要求已认证
pub struct IsAuthenticated;

impl Permission for IsAuthenticated {
    fn name(&self) -> &'static str {
        "is_authenticated"
    }

    fn has_permission(&self, user: Option<&AuthUser>, _access: Access) -> bool {
        user.is_some()
    }
}

/// 读操作开放，写操作要求已认证
pub struct IsAuthenticatedOrReadOnly;

impl Permission for IsAuthenticatedOrReadOnly {
    fn name(&self) -> &'static str {
        "is_authenticated_or_read_only"
    }

    fn has_permission(&self, user: Option<&AuthUser>, access: Access) -> bool {
        access.is_safe() || user.is_some()
    }
}

/// 读操作开放，写操作仅限作者本人
pub struct IsAuthorOrReadOnly;

impl Permission for IsAuthorOrReadOnly {
    fn name(&self) -> &'static str {
        "is_author_or_read_only"
    }

    fn has_object_permission(
        &self,
        user: Option<&AuthUser>,
        access: Access,
        object: &dyn Authored,
    ) -> bool {
        access.is_safe() || user.map_or(false, |u| u.username == object.author())
    }
}

#[derive(Clone)]
pub struct Policy {
    permissions: Arc<[Arc<dyn Permission>]>,
}

impl Policy {
    pub fn new(permissions: Vec<Arc<dyn Permission>>) -> Self {
        Self {
            permissions: permissions.into(),
        }
    }

    /// 帖子与评论：所有人可读，作者可写
    pub fn author_or_read_only() -> Self {
        Self::new(vec![
            Arc::new(IsAuthenticatedOrReadOnly),
            Arc::new(IsAuthorOrReadOnly),
        ])
    }

    pub fn authenticated() -> Self {
        Self::new(vec![Arc::new(IsAuthenticated)])
    }

    pub fn check(&self, user: Option<&AuthUser>, access: Access) -> Result<()> {
        for permission in self.permissions.iter() {
            if !permission.has_permission(user, access) {
                debug!("Permission {} refused request", permission.name());
                return Err(denied(user));
            }
        }
        Ok(())
    }

    pub fn check_object(
        &self,
        user: Option<&AuthUser>,
        access: Access,
        object: &dyn Authored,
    ) -> Result<()> {
        for permission in self.permissions.iter() {
            if !permission.has_object_permission(user, access, object) {
                debug!("Permission {} refused object access", permission.name());
                return Err(denied(user));
            }
        }
        Ok(())
    }
}

fn denied(user: Option<&AuthUser>) -> AppError {
    match user {
        None => AppError::unauthorized("Authentication credentials were not provided"),
        Some(_) => AppError::forbidden("You do not have permission to perform this action"),
    }
}
