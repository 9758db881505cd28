use crate::application_port::AuthError;
use crate::domain_port::SessionStore;
use std::collections::HashSet;
use std::sync::Mutex;

/// In-process session store for the `fake` backend and for tests.
/// TTL expiry is not simulated; records live until consumed or revoked.
pub struct InMemorySessionStore {
    records: Mutex<HashSet<String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        InMemorySessionStore {
            records: Mutex::new(HashSet::new()),
        }
    }

    fn key(subject: &str, jti: &str) -> String {
        format!("{}:{}", subject, jti)
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SessionStore for InMemorySessionStore {
    async fn mark_active(&self, subject: &str, jti: &str, _ttl_secs: u64) -> Result<(), AuthError> {
        self.records
            .lock()
            .expect("session set poisoned")
            .insert(Self::key(subject, jti));
        Ok(())
    }

    async fn consume(&self, subject: &str, jti: &str) -> Result<bool, AuthError> {
        // HashSet::remove under one lock is the check-and-delete.
        Ok(self
            .records
            .lock()
            .expect("session set poisoned")
            .remove(&Self::key(subject, jti)))
    }

    async fn revoke(&self, subject: &str, jti: &str) -> Result<(), AuthError> {
        self.records
            .lock()
            .expect("session set poisoned")
            .remove(&Self::key(subject, jti));
        Ok(())
    }
}
