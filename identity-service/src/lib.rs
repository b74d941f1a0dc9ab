//! Identity service: issues signed bearer tokens, answers remote
//! validation requests, and revokes tokens on logout.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod security;

use std::sync::Arc;

pub use error::{IdentityError, Result};

use security::credentials::CredentialStore;
use token_core::{RevocationStore, TokenIssuer, TokenVerifier};

#[derive(Clone)]
pub struct AppState {
    pub issuer: Arc<TokenIssuer>,
    pub verifier: Arc<TokenVerifier>,
    pub revocation: Arc<dyn RevocationStore>,
    pub credentials: Arc<dyn CredentialStore>,
}
