use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::permissions::Authored;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    /// 作者用户名，创建后不可修改
    pub author: String,
    #[serde(default, alias = "group_id")]
    pub group: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl Authored for Post {
    fn author(&self) -> &str {
        &self.author
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, message = "Text must not be empty"))]
    pub text: String,
    pub group: Option<String>,
    #[validate(length(max = 2048))]
    pub image: Option<String>,
}

/// PATCH 请求体：缺省字段保持不变，显式 `null` 清空 `group`/`image`
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, message = "Text must not be empty"))]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "crate::utils::serde_helpers::double_option")]
    pub group: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::utils::serde_helpers::double_option")]
    pub image: Option<Option<String>>,
}

impl From<CreatePostRequest> for UpdatePostRequest {
    /// PUT 覆盖全部可写字段
    fn from(request: CreatePostRequest) -> Self {
        Self {
            text: Some(request.text),
            group: Some(request.group),
            image: Some(request.image),
        }
    }
}

impl Post {
    pub fn apply(&mut self, update: UpdatePostRequest) {
        if let Some(text) = update.text {
            self.text = text;
        }
        if let Some(group) = update.group {
            self.group = group;
        }
        if let Some(image) = update.image {
            self.image = image;
        }
    }
}
