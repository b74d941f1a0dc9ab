use thiserror::Error;

/// Verification and issuance failures.
///
/// Call sites match on the variant; nothing in the subsystem signals an
/// auth failure through a stringly-typed error or a panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Token does not have three base64url segments, or a segment fails
    /// to decode/parse.
    #[error("malformed token")]
    Malformed,

    /// Signature does not match the shared secret (tampered or foreign
    /// token).
    #[error("invalid token signature")]
    InvalidSignature,

    /// `exp` is not after the current time.
    #[error("token expired")]
    Expired,

    /// Token was revoked before its natural expiry.
    #[error("token revoked")]
    Revoked,

    /// No bearer token on a protected request. Also covers a
    /// non-Bearer `Authorization` scheme, which is treated as "no
    /// token" rather than a decode error.
    #[error("missing bearer token")]
    MissingToken,

    /// Issuance requested with a non-positive TTL.
    #[error("token ttl must be positive")]
    InvalidTtl,

    /// Remote verification could not be completed (timeout, connect
    /// failure). Never admits; surfaces as 503.
    #[error("verification unavailable: {0}")]
    Unavailable(String),

    /// Store or configuration fault. Surfaces as 500.
    #[error("internal auth error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Stable machine-readable reason, carried in the `detail` field of
    /// error responses and mapped back by remote callers.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::Malformed => "MALFORMED",
            AuthError::InvalidSignature => "INVALID_SIGNATURE",
            AuthError::Expired => "EXPIRED",
            AuthError::Revoked => "REVOKED",
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::InvalidTtl => "INVALID_TTL",
            AuthError::Unavailable(_) => "UNAVAILABLE",
            AuthError::Internal(_) => "INTERNAL",
        }
    }

    /// Inverse of [`AuthError::reason`] for the gateway's remote
    /// verification path, which receives the reason in an error body.
    pub fn from_reason(reason: &str) -> Option<Self> {
        match reason {
            "MALFORMED" => Some(AuthError::Malformed),
            "INVALID_SIGNATURE" => Some(AuthError::InvalidSignature),
            "EXPIRED" => Some(AuthError::Expired),
            "REVOKED" => Some(AuthError::Revoked),
            "MISSING_TOKEN" => Some(AuthError::MissingToken),
            _ => None,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => AuthError::InvalidSignature,
            ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::Malformed,
        }
    }
}
