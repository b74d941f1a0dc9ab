//! HS256 codec for the compact signed-token wire format.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::claims::Claims;
use crate::error::AuthError;

/// Signing configuration shared by issuer and verifiers.
///
/// Holds the HMAC keys derived from the process-wide shared secret plus
/// the default token TTL. Constructed once at startup and injected into
/// [`crate::TokenIssuer`] / [`crate::TokenVerifier`]; every service in
/// the deployment must be configured with the same secret or
/// cross-service verification fails closed on signature mismatch.
pub struct TokenConfig {
    encoding: EncodingKey,
    decoding: DecodingKey,
    default_ttl_secs: u64,
}

impl TokenConfig {
    /// Build from base64-encoded key material.
    pub fn from_secret(secret_base64: &str, default_ttl_secs: u64) -> Result<Self, AuthError> {
        let encoding = EncodingKey::from_base64_secret(secret_base64)
            .map_err(|e| AuthError::Internal(format!("invalid signing secret: {e}")))?;
        let decoding = DecodingKey::from_base64_secret(secret_base64)
            .map_err(|e| AuthError::Internal(format!("invalid signing secret: {e}")))?;
        Ok(TokenConfig {
            encoding,
            decoding,
            default_ttl_secs,
        })
    }

    pub fn default_ttl_secs(&self) -> u64 {
        self.default_ttl_secs
    }

    /// Encode claims into a signed token. Deterministic: identical
    /// claims always produce the identical token.
    pub fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("failed to encode token: {e}")))
    }

    /// Decode a token, verifying structure and signature but not expiry.
    ///
    /// Expiry is the verifier's step so that the boundary is exact
    /// (`exp == now` rejects) instead of subject to the library's
    /// default leeway.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }

    /// Decode claims without verifying the signature.
    ///
    /// Maintenance paths only (e.g. reading `exp` off an arbitrary
    /// token for revocation bookkeeping). Never a substitute for
    /// [`TokenConfig::decode`] on a trust boundary.
    pub fn decode_insecure(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.leeway = 0;
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}
