use crate::application_port::{AccessToken, AuthError, Claims, RefreshToken, TokenCodec};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub signing_key: Vec<u8>,
}

/// Symmetric JWT signer. The algorithm is pinned to HS256 on both the
/// encode and decode side; a token claiming any other algorithm in its
/// header fails verification regardless of its signature.
pub struct JwtHs256Codec {
    cfg: JwtConfig,
}

impl JwtHs256Codec {
    pub fn new(cfg: JwtConfig) -> Self {
        JwtHs256Codec { cfg }
    }

    fn sign(
        &self,
        subject: &str,
        jti: Option<String>,
        ttl: Duration,
    ) -> Result<(String, DateTime<Utc>), AuthError> {
        let iat_dt = Utc::now();
        let exp_dt = iat_dt + ttl;
        let claims = Claims {
            sub: subject.to_string(),
            jti,
            iat: iat_dt.timestamp(),
            exp: exp_dt.timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.cfg.signing_key),
        )
        .map_err(|e| AuthError::Internal(e.to_string()))?;
        Ok((token, exp_dt))
    }
}

#[async_trait::async_trait]
impl TokenCodec for JwtHs256Codec {
    async fn mint_access(&self, subject: &str) -> Result<(AccessToken, DateTime<Utc>), AuthError> {
        let (token, exp_dt) = self.sign(subject, None, self.cfg.access_ttl)?;
        Ok((AccessToken(token), exp_dt))
    }

    async fn mint_refresh(
        &self,
        subject: &str,
    ) -> Result<(RefreshToken, String, DateTime<Utc>), AuthError> {
        let jti = Uuid::new_v4().to_string();
        let (token, exp_dt) = self.sign(subject, Some(jti.clone()), self.cfg.refresh_ttl)?;
        Ok((RefreshToken(token), jti, exp_dt))
    }

    async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut v = Validation::new(Algorithm::HS256);
        v.validate_exp = true;
        v.leeway = 0;
        let data = decode::<Claims>(token, &DecodingKey::from_secret(&self.cfg.signing_key), &v)
            .map_err(|e| {
                debug!(kind = ?e.kind(), "token verification failed");
                AuthError::InvalidToken
            })?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(access_ttl: Duration) -> JwtHs256Codec {
        JwtHs256Codec::new(JwtConfig {
            access_ttl,
            refresh_ttl: Duration::from_secs(3600),
            signing_key: b"unit-test-signing-key".to_vec(),
        })
    }

    #[tokio::test]
    async fn access_token_round_trips_without_jti() {
        let codec = codec(Duration::from_secs(900));
        let (token, exp_dt) = codec.mint_access("a@x.com").await.unwrap();
        let claims = codec.verify(&token.0).await.unwrap();
        assert_eq!(claims.sub, "a@x.com");
        assert!(claims.jti.is_none());
        assert_eq!(claims.exp, exp_dt.timestamp());
        assert!(claims.exp > claims.iat);
    }

    #[tokio::test]
    async fn refresh_token_carries_fresh_jti() {
        let codec = codec(Duration::from_secs(900));
        let (t1, jti1, _) = codec.mint_refresh("a@x.com").await.unwrap();
        let (_t2, jti2, _) = codec.mint_refresh("a@x.com").await.unwrap();
        assert_ne!(jti1, jti2);
        let claims = codec.verify(&t1.0).await.unwrap();
        assert_eq!(claims.jti.as_deref(), Some(jti1.as_str()));
    }

    #[tokio::test]
    async fn tampered_token_is_rejected() {
        let codec = codec(Duration::from_secs(900));
        let (token, _) = codec.mint_access("a@x.com").await.unwrap();
        let tampered = format!("{}x", token.0);
        assert!(matches!(
            codec.verify(&tampered).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn token_signed_with_other_key_is_rejected() {
        let codec = codec(Duration::from_secs(900));
        let other = JwtHs256Codec::new(JwtConfig {
            access_ttl: Duration::from_secs(900),
            refresh_ttl: Duration::from_secs(3600),
            signing_key: b"some-other-key".to_vec(),
        });
        let (token, _) = other.mint_access("a@x.com").await.unwrap();
        assert!(matches!(
            codec.verify(&token.0).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn foreign_algorithm_is_rejected() {
        let codec = codec(Duration::from_secs(900));
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "a@x.com".to_string(),
            jti: None,
            iat: now,
            exp: now + 900,
        };
        // Same secret, different algorithm in the header.
        let forged = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(b"unit-test-signing-key"),
        )
        .unwrap();
        assert!(matches!(
            codec.verify(&forged).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let codec = codec(Duration::ZERO);
        let (token, _) = codec.mint_access("a@x.com").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        assert!(matches!(
            codec.verify(&token.0).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn token_is_valid_until_its_ttl_elapses() {
        let codec = codec(Duration::from_secs(2));
        let (token, _) = codec.mint_access("a@x.com").await.unwrap();

        // Still inside the TTL.
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
        codec.verify(&token.0).await.unwrap();

        // Past it.
        tokio::time::sleep(std::time::Duration::from_millis(2100)).await;
        assert!(matches!(
            codec.verify(&token.0).await,
            Err(AuthError::InvalidToken)
        ));
    }
}
