//! Shared token subsystem for all Meridian services.
//!
//! Everything that touches the compact signed-token format lives here:
//! the claims model, the HS256 codec, the issuer, the verifier, and the
//! revocation store. Services compose these pieces explicitly — keys and
//! TTL defaults are carried by [`TokenConfig`] and injected at
//! construction, never held in process-wide globals.

pub mod claims;
pub mod codec;
pub mod error;
pub mod issuer;
pub mod revocation;
pub mod verifier;

pub use claims::{Claims, Principal, ROLE_ADMIN, ROLE_USER};
pub use codec::TokenConfig;
pub use error::AuthError;
pub use issuer::TokenIssuer;
pub use revocation::{
    token_fingerprint, MemoryRevocationStore, RedisRevocationStore, RevocationStore,
};
pub use verifier::TokenVerifier;
