use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 用户名允许字母、数字及 `. @ + - _`
pub static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w.@+-]+$").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        length(min = 1, max = 150, message = "Username must be 1-150 characters"),
        regex(path = "USERNAME_RE", message = "Username may contain only letters, digits and @/./+/-/_")
    )]
    pub username: String,

    #[validate(length(min = 8, max = 128, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(email(message = "Enter a valid email address"))]
    pub email: Option<String>,

    #[validate(length(max = 150))]
    pub first_name: Option<String>,

    #[validate(length(max = 150))]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TokenObtainRequest {
    #[validate(length(min = 1, message = "This field may not be blank"))]
    pub username: String,
    #[validate(length(min = 1, message = "This field may not be blank"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TokenRefreshRequest {
    #[validate(length(min = 1, message = "This field may not be blank"))]
    pub refresh: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TokenVerifyRequest {
    #[validate(length(min = 1, message = "This field may not be blank"))]
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access: String,
}
