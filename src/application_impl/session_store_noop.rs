use crate::application_port::AuthError;
use crate::domain_port::SessionStore;

/// Fallback selected at startup when the revocation store is unreachable.
///
/// Every refresh token whose signature verifies counts as active, so the
/// service keeps issuing tokens but rotation and logout are not enforced.
/// Wiring logs a warning when this variant is chosen; it is never picked
/// silently.
pub struct NoopSessionStore;

#[async_trait::async_trait]
impl SessionStore for NoopSessionStore {
    async fn mark_active(&self, _subject: &str, _jti: &str, _ttl_secs: u64) -> Result<(), AuthError> {
        Ok(())
    }

    async fn consume(&self, _subject: &str, _jti: &str) -> Result<bool, AuthError> {
        Ok(true)
    }

    async fn revoke(&self, _subject: &str, _jti: &str) -> Result<(), AuthError> {
        Ok(())
    }
}
