use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use token_core::AuthError;

/// Wire shape of every rejection produced at an auth boundary.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
    pub detail: String,
}

/// Request rejection raised by [`crate::AuthGate`] / [`crate::RoleGuard`].
///
/// Authentication failures are 401, authorization failures 403, and an
/// unreachable verifier 503 — "cannot determine authentication" is
/// deliberately distinct from "not authenticated".
#[derive(Debug, Error)]
pub enum GateError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Malformed token")]
    Malformed,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Token revoked")]
    Revoked,

    #[error("Insufficient role")]
    InsufficientRole,

    #[error("Verification unavailable")]
    Unavailable,

    #[error("Internal server error")]
    Internal,
}

impl GateError {
    /// Machine-readable reason for the `detail` field.
    pub fn detail(&self) -> &'static str {
        match self {
            GateError::MissingToken => "MISSING_TOKEN",
            GateError::Malformed => "MALFORMED",
            GateError::InvalidSignature => "INVALID_SIGNATURE",
            GateError::Expired => "EXPIRED",
            GateError::Revoked => "REVOKED",
            GateError::InsufficientRole => "INSUFFICIENT_ROLE",
            GateError::Unavailable => "UNAVAILABLE",
            GateError::Internal => "INTERNAL",
        }
    }
}

impl From<AuthError> for GateError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Malformed => GateError::Malformed,
            AuthError::InvalidSignature => GateError::InvalidSignature,
            AuthError::Expired => GateError::Expired,
            AuthError::Revoked => GateError::Revoked,
            AuthError::MissingToken => GateError::MissingToken,
            AuthError::Unavailable(_) => GateError::Unavailable,
            AuthError::InvalidTtl | AuthError::Internal(_) => GateError::Internal,
        }
    }
}

impl ResponseError for GateError {
    fn status_code(&self) -> StatusCode {
        match self {
            GateError::InsufficientRole => StatusCode::FORBIDDEN,
            GateError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            GateError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorBody {
            status: status.as_u16(),
            message: self.to_string(),
            detail: self.detail().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_split_authn_authz_and_availability() {
        assert_eq!(GateError::Expired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(GateError::MissingToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(GateError::InsufficientRole.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            GateError::Unavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            GateError::Internal.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unavailable_maps_from_auth_error() {
        let err = GateError::from(AuthError::Unavailable("timeout".into()));
        assert!(matches!(err, GateError::Unavailable));
    }
}
