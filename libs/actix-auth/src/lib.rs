//! Shared request-pipeline authentication for actix services.
//!
//! One [`AuthGate`] instance per service replaces the
//! extract-verify-admit boilerplate: it bypasses configured public
//! paths, verifies the bearer token through any [`VerifyToken`]
//! implementation, and binds the resulting [`token_core::Principal`]
//! into the request context. [`RoleGuard`] layers static path-to-role
//! authorization on top of an admitted request.

pub mod error;
pub mod extract;
pub mod gate;
pub mod guard;

pub use error::{ErrorBody, GateError};
pub use extract::{AuthPrincipal, BearerToken};
pub use gate::{AuthGate, VerifyToken};
pub use guard::{RoleGuard, RoleRule};
