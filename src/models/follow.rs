use serde::{Deserialize, Serialize};
use validator::Validate;

/// 有向关注关系 `user -> following`，两端均为用户名
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Follow {
    #[serde(skip_serializing)]
    pub id: String,
    pub user: String,
    pub following: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFollowRequest {
    #[validate(length(min = 1, message = "This field may not be blank"))]
    pub following: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct FollowQuery {
    pub search: Option<String>,
}
