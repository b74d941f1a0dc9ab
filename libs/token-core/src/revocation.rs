//! Revocation store: rejects tokens before their natural expiry.
//!
//! Tokens are keyed by sha256 fingerprint so the raw credential never
//! sits in the store or in logs. Entries carry the token's own `exp`,
//! which bounds their useful lifetime: the verifier checks expiry
//! before revocation, so an entry past `exp` only occupies memory.

use async_trait::async_trait;
use dashmap::DashMap;
use redis::aio::ConnectionManager;
use sha2::{Digest, Sha256};

use crate::error::AuthError;

/// Floor for Redis entry TTLs when the underlying token has already
/// expired by the time it is revoked.
const MIN_REDIS_TTL_SECS: i64 = 300;

/// sha256 hex of a token, used as the storage key and for log
/// correlation.
pub fn token_fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Early-invalidation set consulted by every [`crate::TokenVerifier`].
///
/// `revoke` is idempotent, and once it returns, `is_revoked` for the
/// same token observes `true` from any task — there is no staleness
/// window.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    async fn revoke(&self, token: &str, expires_at: i64) -> Result<(), AuthError>;

    async fn is_revoked(&self, token: &str) -> Result<bool, AuthError>;

    /// Drop entries whose token already passed `expires_at`.
    ///
    /// Purely a space optimization — correctness never depends on it
    /// because verification rejects expired tokens first. Returns the
    /// number of entries removed.
    async fn sweep_expired(&self, now: i64) -> Result<u64, AuthError>;
}

/// Process-local store on a concurrent map.
#[derive(Default)]
pub struct MemoryRevocationStore {
    entries: DashMap<String, i64>,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn revoke(&self, token: &str, expires_at: i64) -> Result<(), AuthError> {
        self.entries.insert(token_fingerprint(token), expires_at);
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, AuthError> {
        Ok(self.entries.contains_key(&token_fingerprint(token)))
    }

    async fn sweep_expired(&self, now: i64) -> Result<u64, AuthError> {
        let before = self.entries.len();
        self.entries.retain(|_, expires_at| *expires_at > now);
        Ok(before.saturating_sub(self.entries.len()) as u64)
    }
}

/// Redis-backed store for deployments where gateway and services must
/// observe each other's revocations.
///
/// Each entry is written with `EX` set to the token's remaining
/// lifetime, so Redis expiry is the sweep.
pub struct RedisRevocationStore {
    redis: ConnectionManager,
    key_prefix: String,
}

impl RedisRevocationStore {
    pub fn new(redis: ConnectionManager, key_prefix: impl Into<String>) -> Self {
        RedisRevocationStore {
            redis,
            key_prefix: key_prefix.into(),
        }
    }

    fn key(&self, token: &str) -> String {
        format!("{}:revoked:{}", self.key_prefix, token_fingerprint(token))
    }
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn revoke(&self, token: &str, expires_at: i64) -> Result<(), AuthError> {
        let now = chrono::Utc::now().timestamp();
        let ttl = (expires_at - now).max(MIN_REDIS_TTL_SECS);

        let mut redis = self.redis.clone();
        redis::cmd("SET")
            .arg(self.key(token))
            .arg("1")
            .arg("EX")
            .arg(ttl)
            .query_async::<_, ()>(&mut redis)
            .await
            .map_err(|e| AuthError::Internal(format!("redis revoke failed: {e}")))?;

        tracing::info!(ttl_secs = ttl, "token revoked");
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, AuthError> {
        let mut redis = self.redis.clone();
        redis::cmd("EXISTS")
            .arg(self.key(token))
            .query_async(&mut redis)
            .await
            .map_err(|e| AuthError::Internal(format!("redis lookup failed: {e}")))
    }

    async fn sweep_expired(&self, _now: i64) -> Result<u64, AuthError> {
        // Redis evicts on per-key TTL; nothing to do here.
        Ok(0)
    }
}
