use crate::application_port::AuthError;
use crate::domain_port::{CredentialRecord, UserRepo};
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use std::future::Future;
use std::time::Duration;

const OP_TIMEOUT: Duration = Duration::from_secs(2);

/// Bounds a store call like the session-store adapter does: a stalled
/// connection surfaces as a store error instead of hanging the request.
async fn bounded<T, F>(op: F) -> Result<T, AuthError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(OP_TIMEOUT, op).await {
        Ok(res) => res.map_err(map_db_err),
        Err(_) => Err(AuthError::Store("user store timeout".to_string())),
    }
}

fn map_db_err(e: sqlx::Error) -> AuthError {
    if e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
    {
        AuthError::AlreadyExists
    } else {
        AuthError::Store(e.to_string())
    }
}

/// Durable user-credential store. Expected schema:
///
/// ```sql
/// CREATE TABLE user_credential (
///     email         VARCHAR(255) NOT NULL PRIMARY KEY,
///     password_hash VARCHAR(255) NOT NULL,
///     created_at    TIMESTAMP    NOT NULL DEFAULT CURRENT_TIMESTAMP
/// );
/// ```
///
/// Email uniqueness is the primary key, so concurrent registrations across
/// service instances are arbitrated by the database, not by this process.
pub struct MySqlUserRepo {
    pool: MySqlPool,
}

impl MySqlUserRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlUserRepo { pool }
    }

    fn row_to_record(row: MySqlRow) -> Result<CredentialRecord, AuthError> {
        let email: String = row
            .try_get("email")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let password_hash: String = row
            .try_get("password_hash")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let created_at: DateTime<Utc> = row
            .try_get("created_at")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        Ok(CredentialRecord {
            email,
            password_hash,
            created_at,
        })
    }
}

#[async_trait::async_trait]
impl UserRepo for MySqlUserRepo {
    async fn create(&self, email: &str, password_hash: &str) -> Result<(), AuthError> {
        bounded(
            sqlx::query(
                r#"
INSERT INTO user_credential (email, password_hash)
VALUES (?, ?)
"#,
            )
            .bind(email)
            .bind(password_hash)
            .execute(&self.pool),
        )
        .await?;

        Ok(())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, AuthError> {
        let row_opt: Option<MySqlRow> = bounded(
            sqlx::query(
                r#"
SELECT email, password_hash, created_at
FROM user_credential
WHERE email = ?
"#,
            )
            .bind(email)
            .fetch_optional(&self.pool),
        )
        .await?;

        row_opt.map(Self::row_to_record).transpose()
    }
}
