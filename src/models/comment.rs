use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::permissions::Authored;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author: String,
    /// 所属帖子 ID，取自 URL 路径而非请求体
    #[serde(alias = "post_id")]
    pub post: String,
    pub text: String,
    pub created: DateTime<Utc>,
}

impl Authored for Comment {
    fn author(&self) -> &str {
        &self.author
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 10000, message = "Text must be 1-10000 characters"))]
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1, max = 10000, message = "Text must be 1-10000 characters"))]
    pub text: Option<String>,
}

impl From<CreateCommentRequest> for UpdateCommentRequest {
    fn from(request: CreateCommentRequest) -> Self {
        Self {
            text: Some(request.text),
        }
    }
}
