use crate::application_port::AuthError;
use crate::domain_port::SessionStore;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::time::Duration;
use tracing::debug;

const OP_TIMEOUT: Duration = Duration::from_secs(2);

/// Revocation records live under `<prefix>:<subject>:<jti>` with a TTL equal
/// to the refresh window, so an unredeemed token's record ages out on its
/// own. The value is a bare presence marker.
pub struct RedisSessionStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisSessionStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisSessionStore {
            conn,
            prefix: prefix.into(),
        }
    }

    /// Fails if no connection can be established, which is what lets the
    /// wiring fall back to the degraded no-op store at startup.
    pub async fn connect(url: &str, prefix: impl Into<String>) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self::new(conn, prefix))
    }

    fn key(&self, subject: &str, jti: &str) -> String {
        format!("{}:{}:{}", self.prefix, subject, jti)
    }

    async fn try_set(&self, key: &str, ttl_secs: u64) -> Result<(), AuthError> {
        let mut conn = self.conn.clone();
        match tokio::time::timeout(OP_TIMEOUT, conn.set_ex::<_, _, ()>(key, "1", ttl_secs)).await {
            Ok(res) => res.map_err(|e| AuthError::Store(e.to_string())),
            Err(_) => Err(AuthError::Store("session store timeout".to_string())),
        }
    }

    async fn try_del(&self, key: &str) -> Result<i64, AuthError> {
        let mut conn = self.conn.clone();
        match tokio::time::timeout(OP_TIMEOUT, conn.del::<_, i64>(key)).await {
            Ok(res) => res.map_err(|e| AuthError::Store(e.to_string())),
            Err(_) => Err(AuthError::Store("session store timeout".to_string())),
        }
    }
}

#[async_trait::async_trait]
impl SessionStore for RedisSessionStore {
    async fn mark_active(&self, subject: &str, jti: &str, ttl_secs: u64) -> Result<(), AuthError> {
        let key = self.key(subject, jti);
        // SET is idempotent, so one retry after a timeout is safe.
        if let Err(err) = self.try_set(&key, ttl_secs).await {
            debug!(%err, "retrying session record write");
            self.try_set(&key, ttl_secs).await?;
        }
        Ok(())
    }

    async fn consume(&self, subject: &str, jti: &str) -> Result<bool, AuthError> {
        // DEL's removed-count is the atomic check-and-delete: exactly one
        // concurrent caller for a key observes 1. Never retried; after an
        // ambiguous first attempt a second DEL could report a consumed
        // record as absent.
        let removed = self.try_del(&self.key(subject, jti)).await?;
        Ok(removed > 0)
    }

    async fn revoke(&self, subject: &str, jti: &str) -> Result<(), AuthError> {
        let key = self.key(subject, jti);
        if let Err(err) = self.try_del(&key).await {
            debug!(%err, "retrying session record delete");
            self.try_del(&key).await?;
        }
        Ok(())
    }
}
