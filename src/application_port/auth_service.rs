use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("user already exists")]
    AlreadyExists,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("token invalid")]
    InvalidToken,
    #[error("token revoked")]
    RevokedToken,
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Payload of a signed token. Access tokens carry no `jti`; refresh tokens
/// always do. That is the only kind discriminator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessToken(pub String);

#[derive(Debug, Clone, Serialize)]
pub struct RefreshToken(pub String);

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
}

#[async_trait::async_trait]
pub trait TokenCodec: Send + Sync {
    async fn mint_access(&self, subject: &str) -> Result<(AccessToken, DateTime<Utc>), AuthError>;
    /// Returns the token together with its freshly generated `jti` so the
    /// caller can register the revocation record.
    async fn mint_refresh(
        &self,
        subject: &str,
    ) -> Result<(RefreshToken, String, DateTime<Utc>), AuthError>;
    async fn verify(&self, token: &str) -> Result<Claims, AuthError>;
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError>;
    async fn verify_password(&self, password: &str, password_hash: &str)
    -> Result<bool, AuthError>;
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn register(&self, request: RegisterInput) -> Result<(), AuthError>;
    async fn login(&self, request: LoginInput) -> Result<TokenPair, AuthError>;
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;
    /// Idempotent: succeeds no matter what token is presented.
    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError>;
    async fn authorize(&self, access_token: &str) -> Result<Claims, AuthError>;
}
