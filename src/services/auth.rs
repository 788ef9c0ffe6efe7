use crate::{
    config::Config,
    error::{AppError, Result},
    models::user::User,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// 当前请求的认证用户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,        // 用户ID
    pub username: String,   // 用户名
    pub token_type: TokenType,
    pub exp: i64,           // 过期时间
    pub iat: i64,           // 签发时间
    pub jti: String,        // 令牌ID
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Clone)]
pub struct AuthService {
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl AuthService {
    pub fn new(config: &Config) -> Result<Self> {
        if config.jwt_secret.is_empty() {
            return Err(AppError::internal("JWT secret must not be empty"));
        }

        Ok(Self {
            encoding_key: Arc::new(EncodingKey::from_secret(config.jwt_secret.as_bytes())),
            decoding_key: Arc::new(DecodingKey::from_secret(config.jwt_secret.as_bytes())),
            access_ttl: Duration::minutes(config.jwt_access_ttl_minutes),
            refresh_ttl: Duration::days(config.jwt_refresh_ttl_days),
        })
    }

    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    pub fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        match PasswordHash::new(password_hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                warn!("Stored password hash is unreadable: {}", e);
                false
            }
        }
    }

    fn sign(&self, user: &AuthUser, token_type: TokenType, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            token_type,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().simple().to_string(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    pub fn issue_tokens(&self, user: &AuthUser) -> Result<TokenPair> {
        Ok(TokenPair {
            access: self.sign(user, TokenType::Access, self.access_ttl)?,
            refresh: self.sign(user, TokenType::Refresh, self.refresh_ttl)?,
        })
    }

    pub fn verify_jwt(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(Algorithm::HS256);

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(token_data) => {
                debug!("JWT token verified for user: {}", token_data.claims.sub);
                Ok(token_data.claims)
            }
            Err(e) => {
                debug!("JWT verification failed: {}", e);
                Err(AppError::Authentication("Token is invalid or expired".to_string()))
            }
        }
    }

    /// 只有 access 令牌可以用于认证请求
    pub fn authenticate(&self, token: &str) -> Result<AuthUser> {
        let claims = self.verify_jwt(token)?;
        if claims.token_type != TokenType::Access {
            return Err(AppError::unauthorized("Token has wrong type"));
        }
        Ok(AuthUser {
            id: claims.sub,
            username: claims.username,
        })
    }

    pub fn refresh_access(&self, refresh_token: &str) -> Result<String> {
        let claims = self.verify_jwt(refresh_token)?;
        if claims.token_type != TokenType::Refresh {
            return Err(AppError::unauthorized("Token has wrong type"));
        }
        let user = AuthUser {
            id: claims.sub,
            username: claims.username,
        };
        self.sign(&user, TokenType::Access, self.access_ttl)
    }
}

// 认证用户提取器
#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized("Authentication credentials were not provided"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(&Config::default()).unwrap()
    }

    fn alice() -> AuthUser {
        AuthUser {
            id: "u1".to_string(),
            username: "alice".to_string(),
        }
    }

    #[test]
    fn test_password_round_trip() {
        let auth = service();
        let hash = auth.hash_password("correct-horse").unwrap();
        assert!(auth.verify_password("correct-horse", &hash));
        assert!(!auth.verify_password("wrong-horse", &hash));
        assert!(!auth.verify_password("correct-horse", "not-a-hash"));
    }

    #[test]
    fn test_access_token_authenticates() {
        let auth = service();
        let tokens = auth.issue_tokens(&alice()).unwrap();
        assert_eq!(auth.authenticate(&tokens.access).unwrap(), alice());
    }

    #[test]
    fn test_refresh_token_cannot_authenticate() {
        let auth = service();
        let tokens = auth.issue_tokens(&alice()).unwrap();
        assert!(matches!(
            auth.authenticate(&tokens.refresh),
            Err(AppError::Authentication(_))
        ));
    }

    #[test]
    fn test_refresh_issues_new_access_token() {
        let auth = service();
        let tokens = auth.issue_tokens(&alice()).unwrap();
        let access = auth.refresh_access(&tokens.refresh).unwrap();
        assert_eq!(auth.authenticate(&access).unwrap(), alice());
        assert!(auth.refresh_access(&tokens.access).is_err());
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let other = AuthService::new(&Config {
            jwt_secret: "another-secret".to_string(),
            ..Config::default()
        })
        .unwrap();
        let tokens = other.issue_tokens(&alice()).unwrap();
        assert!(service().verify_jwt(&tokens.access).is_err());
        assert!(service().verify_jwt("garbage").is_err());
    }
}
