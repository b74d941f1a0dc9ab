//! Remote verification against the identity service.

use std::time::Duration;

use actix_auth::ErrorBody;
use serde::{Deserialize, Serialize};
use token_core::{AuthError, Principal};

#[derive(Debug, Serialize)]
struct ValidateRequest<'a> {
    token: &'a str,
}

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    username: String,
    roles: Vec<String>,
    #[serde(rename = "expiresAt")]
    #[allow(dead_code)]
    expires_at: i64,
}

/// Client for `POST /api/v1/auth/validate`.
///
/// The whole call is bounded by a fixed timeout and fails closed: a
/// verifier that cannot be reached rejects the request as
/// [`AuthError::Unavailable`] rather than admitting it.
pub struct RemoteVerifier {
    http: reqwest::Client,
    validate_url: String,
}

impl RemoteVerifier {
    pub fn new(validate_url: impl Into<String>, timeout: Duration) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Internal(format!("failed to build http client: {e}")))?;
        Ok(RemoteVerifier {
            http,
            validate_url: validate_url.into(),
        })
    }

    pub async fn validate(&self, token: &str) -> Result<Principal, AuthError> {
        let response = self
            .http
            .post(&self.validate_url)
            .json(&ValidateRequest { token })
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let body: ValidateResponse = response
                .json()
                .await
                .map_err(|e| AuthError::Unavailable(format!("invalid validation response: {e}")))?;
            return Ok(Principal::from_parts(body.username, body.roles));
        }

        // The identity service reports the typed reason in the error
        // body; carry it through when it parses.
        if let Some(err) = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| AuthError::from_reason(&body.detail))
        {
            return Err(err);
        }

        if status.is_server_error() {
            Err(AuthError::Unavailable(format!(
                "identity service returned {status}"
            )))
        } else {
            Err(AuthError::Malformed)
        }
    }
}
