use crate::application_port::AuthError;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct CredentialRecord {
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    /// Insert a credential row. Uniqueness of `email` is enforced by the
    /// store itself; a duplicate fails with `AuthError::AlreadyExists`.
    async fn create(&self, email: &str, password_hash: &str) -> Result<(), AuthError>;

    /// Fetch credentials by email (for login).
    async fn get_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, AuthError>;
}
