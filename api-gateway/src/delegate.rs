use std::sync::Arc;

use async_trait::async_trait;

use actix_auth::VerifyToken;
use token_core::{AuthError, Principal, TokenVerifier};

use crate::remote::RemoteVerifier;

/// Per-path verification strategy for the edge.
///
/// Paths under a configured remote prefix are verified by the identity
/// service; everything else is verified in-process against the shared
/// secret. Both outcomes admit identically.
pub struct DelegatingVerifier {
    local: Arc<TokenVerifier>,
    remote: Arc<RemoteVerifier>,
    remote_paths: Vec<String>,
}

impl DelegatingVerifier {
    pub fn new(
        local: Arc<TokenVerifier>,
        remote: Arc<RemoteVerifier>,
        remote_paths: Vec<String>,
    ) -> Self {
        DelegatingVerifier {
            local,
            remote,
            remote_paths,
        }
    }
}

#[async_trait]
impl VerifyToken for DelegatingVerifier {
    async fn verify_token(&self, token: &str, path: &str) -> Result<Principal, AuthError> {
        if self
            .remote_paths
            .iter()
            .any(|p| path.starts_with(p.as_str()))
        {
            tracing::debug!(path, "delegating token verification");
            self.remote.validate(token).await
        } else {
            self.local.verify(token).await
        }
    }
}
