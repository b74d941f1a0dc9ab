use std::sync::Arc;

use crate::claims::Claims;
use crate::codec::TokenConfig;
use crate::error::AuthError;

/// Builds signed tokens for authenticated principals.
///
/// Issuance has no side effects: nothing is registered anywhere, the
/// caller simply receives the token string.
pub struct TokenIssuer {
    config: Arc<TokenConfig>,
}

impl TokenIssuer {
    pub fn new(config: Arc<TokenConfig>) -> Self {
        TokenIssuer { config }
    }

    pub fn default_ttl_secs(&self) -> u64 {
        self.config.default_ttl_secs()
    }

    /// Issue with the configured default TTL.
    pub fn issue(&self, subject: &str, roles: &[String]) -> Result<String, AuthError> {
        self.issue_with_ttl(subject, roles, self.config.default_ttl_secs())
    }

    /// Issue with an explicit TTL in seconds. The TTL must be positive.
    pub fn issue_with_ttl(
        &self,
        subject: &str,
        roles: &[String],
        ttl_secs: u64,
    ) -> Result<String, AuthError> {
        if ttl_secs == 0 {
            return Err(AuthError::InvalidTtl);
        }
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_owned(),
            roles: roles.to_vec(),
            iat: now,
            exp: now + ttl_secs as i64,
        };
        self.config.encode(&claims)
    }
}
