use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use token_core::Principal;

use crate::error::GateError;

/// Typed handler access to the verified identity bound by
/// [`crate::AuthGate`].
#[derive(Debug, Clone)]
pub struct AuthPrincipal(pub Principal);

impl FromRequest for AuthPrincipal {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Principal>()
                .cloned()
                .map(AuthPrincipal)
                .ok_or_else(|| GateError::MissingToken.into()),
        )
    }
}

/// The raw bearer credential of an admitted request.
///
/// Needed by handlers that act on the token itself, e.g. logout
/// revoking the presented token.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl FromRequest for BearerToken {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<BearerToken>()
                .cloned()
                .ok_or_else(|| GateError::MissingToken.into()),
        )
    }
}
