use crate::application_port::AuthError;
use crate::domain_port::{CredentialRecord, UserRepo};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-process user store for the `fake` backend and for tests. A single
/// instance shares nothing with other processes; the durable backend is
/// `MySqlUserRepo`.
pub struct InMemoryUserRepo {
    users: Mutex<HashMap<String, CredentialRecord>>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        InMemoryUserRepo {
            users: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryUserRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl UserRepo for InMemoryUserRepo {
    async fn create(&self, email: &str, password_hash: &str) -> Result<(), AuthError> {
        let mut users = self.users.lock().expect("user map poisoned");
        if users.contains_key(email) {
            return Err(AuthError::AlreadyExists);
        }
        users.insert(
            email.to_string(),
            CredentialRecord {
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, AuthError> {
        Ok(self
            .users
            .lock()
            .expect("user map poisoned")
            .get(email)
            .cloned())
    }
}
