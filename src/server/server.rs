use crate::application_impl::{
    Argon2PasswordHasher, InMemorySessionStore, InMemoryUserRepo, JwtConfig, JwtHs256Codec,
    NoopSessionStore, RealAuthService,
};
use crate::application_port::{AuthService, CredentialHasher, TokenCodec};
use crate::domain_port::{SessionStore, UserRepo};
use crate::infra_mysql::MySqlUserRepo;
use crate::infra_redis::RedisSessionStore;
use crate::logger::*;
use crate::settings::{Settings, parse_duration};
use sqlx::MySqlPool;
use std::sync::Arc;

const SESSION_KEY_PREFIX: &str = "session";

pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let access_ttl = parse_duration(&settings.auth.access_ttl)?;
        let refresh_ttl = parse_duration(&settings.auth.refresh_ttl)?;

        let signing_key = std::env::var("JWT_SECRET")
            .unwrap_or_else(|_| settings.auth.signing_key.clone());
        if signing_key.is_empty() {
            return Err(anyhow::anyhow!(
                "signing key is not configured; set JWT_SECRET or auth.signing_key"
            ));
        }

        let codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
            access_ttl,
            refresh_ttl,
            signing_key: signing_key.into_bytes(),
        }));
        let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher);

        let session_store: Arc<dyn SessionStore> = match settings.session.backend.as_str() {
            "fake" => Arc::new(InMemorySessionStore::new()),
            // Availability over consistency: an unreachable revocation store
            // degrades the service to signature-only validation instead of
            // refusing all traffic.
            "redis" => match RedisSessionStore::connect(&settings.session.url, SESSION_KEY_PREFIX)
                .await
            {
                Ok(store) => {
                    info!(url = %settings.session.url, "revocation store connected");
                    Arc::new(store)
                }
                Err(err) => {
                    warn!(
                        url = %settings.session.url,
                        %err,
                        "revocation store unreachable; refresh rotation and logout are NOT enforced"
                    );
                    Arc::new(NoopSessionStore)
                }
            },
            other => return Err(anyhow::anyhow!("unknown session backend: {}", other)),
        };

        // The user store is not allowed to degrade: without it no principal
        // can be authenticated, so a connection failure aborts startup.
        let user_repo: Arc<dyn UserRepo> = match settings.user.backend.as_str() {
            "fake" => Arc::new(InMemoryUserRepo::new()),
            "real" => {
                let pool = MySqlPool::connect(&settings.user.dsn).await?;
                Arc::new(MySqlUserRepo::new(pool))
            }
            other => return Err(anyhow::anyhow!("unknown user backend: {}", other)),
        };

        let auth_service: Arc<dyn AuthService> =
            Arc::new(RealAuthService::new(user_repo, hasher, codec, session_store));

        Ok(Server { auth_service })
    }
}
