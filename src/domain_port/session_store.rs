use crate::application_port::AuthError;

/// Revocation state for refresh tokens, one record per outstanding token.
/// A record exists iff the (subject, jti) refresh token is still redeemable.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Create or overwrite the record with the given TTL.
    async fn mark_active(&self, subject: &str, jti: &str, ttl_secs: u64) -> Result<(), AuthError>;

    /// Atomic check-and-delete. Returns whether the record existed.
    /// Rotation is one-shot only because this is a single conditional
    /// operation; concurrent callers for the same (subject, jti) must see
    /// `true` at most once.
    async fn consume(&self, subject: &str, jti: &str) -> Result<bool, AuthError>;

    /// Best-effort delete. Callers treat a failure as a logging concern,
    /// never as a reason to fail the surrounding operation.
    async fn revoke(&self, subject: &str, jti: &str) -> Result<(), AuthError>;
}
