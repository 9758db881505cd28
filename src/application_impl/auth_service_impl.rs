use crate::application_port::{
    AuthError, AuthService, Claims, CredentialHasher, LoginInput, RegisterInput, TokenCodec,
    TokenPair,
};
use crate::domain_port::{SessionStore, UserRepo};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

/// Token lifecycle manager plus authentication gate.
///
/// Access tokens are stateless: minted, verified by signature, never looked
/// up. Refresh tokens are stateful: each one is tracked by a revocation
/// record in the session store and is redeemable exactly once.
pub struct RealAuthService {
    user_repo: Arc<dyn UserRepo>,
    hasher: Arc<dyn CredentialHasher>,
    codec: Arc<dyn TokenCodec>,
    session_store: Arc<dyn SessionStore>,
}

impl RealAuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepo>,
        hasher: Arc<dyn CredentialHasher>,
        codec: Arc<dyn TokenCodec>,
        session_store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            user_repo,
            hasher,
            codec,
            session_store,
        }
    }

    fn ttl_secs(until: DateTime<Utc>) -> u64 {
        let secs = (until - Utc::now()).num_seconds();
        if secs <= 0 { 1 } else { secs as u64 }
    }

    /// Mints a fresh pair and registers the refresh half. The pair is not
    /// returned unless the revocation record was written: an untracked
    /// refresh token would always fail redemption later.
    async fn issue_pair(&self, subject: &str) -> Result<TokenPair, AuthError> {
        let (access_token, _access_exp) = self.codec.mint_access(subject).await?;
        let (refresh_token, jti, refresh_exp) = self.codec.mint_refresh(subject).await?;
        self.session_store
            .mark_active(subject, &jti, Self::ttl_secs(refresh_exp))
            .await?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn register(&self, request: RegisterInput) -> Result<(), AuthError> {
        let RegisterInput { email, password } = request;
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidInput(
                "email and password required".to_string(),
            ));
        }
        let password_hash = self.hasher.hash_password(&password).await?;
        // Uniqueness is enforced by the user store, not by a check here.
        self.user_repo.create(&email, &password_hash).await
    }

    async fn login(&self, request: LoginInput) -> Result<TokenPair, AuthError> {
        let LoginInput { email, password } = request;

        // Unknown email and wrong password fail identically.
        let rec = self
            .user_repo
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        let ok = self
            .hasher
            .verify_password(&password, &rec.password_hash)
            .await?;
        if !ok {
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_pair(&email).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.codec.verify(refresh_token).await?;
        let jti = claims.jti.ok_or(AuthError::InvalidToken)?;
        if claims.sub.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        // One-shot rotation: the old record is consumed (check-and-delete in
        // a single conditional operation) before the new pair exists, so of
        // any number of concurrent redeemers at most one proceeds, and a
        // cancellation mid-way can only lose a session, never duplicate one.
        if !self.session_store.consume(&claims.sub, &jti).await? {
            debug!(subject = %claims.sub, "refresh token already rotated or revoked");
            return Err(AuthError::RevokedToken);
        }

        self.issue_pair(&claims.sub).await
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        // A token the caller can no longer use is already logged out;
        // nothing here fails loudly.
        match self.codec.verify(refresh_token).await {
            Ok(Claims { sub, jti: Some(jti), .. }) => {
                if let Err(err) = self.session_store.revoke(&sub, &jti).await {
                    warn!(subject = %sub, %err, "logout revoke failed, record expires via TTL");
                }
            }
            Ok(_) => debug!("logout with a jti-less token ignored"),
            Err(_) => debug!("logout with an unverifiable token ignored"),
        }
        Ok(())
    }

    async fn authorize(&self, access_token: &str) -> Result<Claims, AuthError> {
        // Signature-only by design; no store lookup for access tokens.
        self.codec.verify(access_token).await
    }
}
