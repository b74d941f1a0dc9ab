use actix_auth::ErrorBody;
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;
use token_core::AuthError;

pub type Result<T> = std::result::Result<T, IdentityError>;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Token(#[from] AuthError),

    #[error("Internal server error")]
    Internal(String),
}

impl IdentityError {
    fn detail(&self) -> &'static str {
        match self {
            IdentityError::InvalidCredentials => "INVALID_CREDENTIALS",
            IdentityError::Token(err) => err.reason(),
            IdentityError::Internal(_) => "INTERNAL",
        }
    }
}

impl ResponseError for IdentityError {
    fn status_code(&self) -> StatusCode {
        match self {
            IdentityError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            IdentityError::Token(AuthError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            IdentityError::Token(AuthError::Internal(_) | AuthError::InvalidTtl) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            IdentityError::Token(_) => StatusCode::UNAUTHORIZED,
            IdentityError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            // Details stay in the logs; the body only says something broke.
            tracing::error!(error = ?self, "request failed");
        }
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
    fn verification_failures_are_unauthorized() {
        for err in [
            AuthError::Malformed,
            AuthError::InvalidSignature,
            AuthError::Expired,
            AuthError::Revoked,
        ] {
            assert_eq!(
                IdentityError::Token(err).status_code(),
                StatusCode::UNAUTHORIZED
            );
        }
    }

    #[test]
    fn store_faults_are_server_errors() {
        let err = IdentityError::Token(AuthError::Internal("redis down".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
