use std::sync::Arc;

use crate::claims::{Claims, Principal};
use crate::codec::TokenConfig;
use crate::error::AuthError;
use crate::revocation::RevocationStore;

/// Validates tokens at a trust boundary.
///
/// Checks run in a fixed order — signature, then expiry, then
/// revocation — so a forged token is always reported as forged rather
/// than leaking which later check it would have failed. Stateless and
/// freely shared across request workers.
pub struct TokenVerifier {
    config: Arc<TokenConfig>,
    revocation: Arc<dyn RevocationStore>,
}

impl TokenVerifier {
    pub fn new(config: Arc<TokenConfig>, revocation: Arc<dyn RevocationStore>) -> Self {
        TokenVerifier { config, revocation }
    }

    /// Validate and return the raw claims.
    ///
    /// A token whose `exp` equals the current second is already
    /// expired.
    pub async fn verify_claims(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.config.decode(token)?;

        let now = chrono::Utc::now().timestamp();
        if claims.exp <= now {
            return Err(AuthError::Expired);
        }

        if self.revocation.is_revoked(token).await? {
            return Err(AuthError::Revoked);
        }

        Ok(claims)
    }

    /// Validate and build the request-scoped [`Principal`].
    pub async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let claims = self.verify_claims(token).await?;
        Ok(Principal::from_claims(&claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issuer::TokenIssuer;
    use crate::revocation::MemoryRevocationStore;
    use crate::ROLE_USER;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;

    struct Fixture {
        config: Arc<TokenConfig>,
        issuer: TokenIssuer,
        store: Arc<MemoryRevocationStore>,
        verifier: TokenVerifier,
    }

    fn fixture() -> Fixture {
        let config = Arc::new(
            TokenConfig::from_secret(
                &BASE64.encode(b"meridian-test-secret-0123456789abcdef"),
                3600,
            )
            .unwrap(),
        );
        let store = Arc::new(MemoryRevocationStore::new());
        Fixture {
            config: config.clone(),
            issuer: TokenIssuer::new(config.clone()),
            store: store.clone(),
            verifier: TokenVerifier::new(config, store),
        }
    }

    fn token_with_exp(config: &TokenConfig, exp: i64) -> String {
        let now = chrono::Utc::now().timestamp();
        config
            .encode(&Claims {
                sub: "alice".into(),
                roles: vec![ROLE_USER.into()],
                iat: now - 60,
                exp,
            })
            .unwrap()
    }

    #[tokio::test]
    async fn round_trip_yields_matching_principal() {
        let fx = fixture();
        let token = fx
            .issuer
            .issue_with_ttl("alice", &[ROLE_USER.to_string()], 60)
            .unwrap();

        let principal = fx.verifier.verify(&token).await.unwrap();
        assert_eq!(principal.subject, "alice");
        assert!(principal.is_user);
        assert!(!principal.is_admin);
    }

    #[tokio::test]
    async fn token_expiring_this_second_is_expired() {
        let fx = fixture();
        let now = chrono::Utc::now().timestamp();
        let token = token_with_exp(&fx.config, now);
        assert_eq!(fx.verifier.verify(&token).await.unwrap_err(), AuthError::Expired);
    }

    #[tokio::test]
    async fn token_expired_in_the_past_is_expired() {
        let fx = fixture();
        let now = chrono::Utc::now().timestamp();
        let token = token_with_exp(&fx.config, now - 30);
        assert_eq!(fx.verifier.verify(&token).await.unwrap_err(), AuthError::Expired);
    }

    #[tokio::test]
    async fn token_expiring_in_the_future_is_accepted() {
        let fx = fixture();
        let now = chrono::Utc::now().timestamp();
        let token = token_with_exp(&fx.config, now + 60);
        assert!(fx.verifier.verify(&token).await.is_ok());
    }

    #[tokio::test]
    async fn revoked_token_is_rejected() {
        let fx = fixture();
        let token = fx
            .issuer
            .issue_with_ttl("alice", &[ROLE_USER.to_string()], 60)
            .unwrap();
        let claims = fx.config.decode(&token).unwrap();
        fx.store.revoke(&token, claims.exp).await.unwrap();

        assert_eq!(fx.verifier.verify(&token).await.unwrap_err(), AuthError::Revoked);
    }

    #[tokio::test]
    async fn expiry_is_reported_before_revocation() {
        let fx = fixture();
        let now = chrono::Utc::now().timestamp();
        let token = token_with_exp(&fx.config, now - 10);
        fx.store.revoke(&token, now - 10).await.unwrap();

        assert_eq!(fx.verifier.verify(&token).await.unwrap_err(), AuthError::Expired);
    }

    #[tokio::test]
    async fn tampered_token_is_reported_as_forged() {
        let fx = fixture();
        let token = fx
            .issuer
            .issue_with_ttl("alice", &[ROLE_USER.to_string()], 60)
            .unwrap();

        let mut parts: Vec<String> = token.split('.').map(str::to_owned).collect();
        let payload = parts[1].clone();
        let mid = payload.len() / 2;
        let flipped = if payload.as_bytes()[mid] == b'A' { 'B' } else { 'A' };
        parts[1] = format!("{}{}{}", &payload[..mid], flipped, &payload[mid + 1..]);
        let tampered = parts.join(".");

        assert_eq!(
            fx.verifier.verify(&tampered).await.unwrap_err(),
            AuthError::InvalidSignature
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_verification_is_consistent() {
        let fx = fixture();
        let token = fx
            .issuer
            .issue_with_ttl("alice", &[ROLE_USER.to_string()], 600)
            .unwrap();
        let verifier = Arc::new(fx.verifier);

        let mut handles = Vec::new();
        for _ in 0..100 {
            let verifier = verifier.clone();
            let token = token.clone();
            handles.push(tokio::spawn(async move {
                verifier.verify(&token).await.unwrap()
            }));
        }
        for handle in handles {
            let principal = handle.await.unwrap();
            assert_eq!(principal.subject, "alice");
            assert!(principal.is_user);
        }
    }
}
