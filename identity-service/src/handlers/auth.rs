//! Authentication handlers: login, remote validation, logout.

use actix_auth::BearerToken;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::error::IdentityError;
use crate::metrics;
use crate::AppState;
use token_core::token_fingerprint;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub subject: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub token: String,
}

/// Response of the remote-verification protocol consumed by gateways.
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub username: String,
    pub roles: Vec<String>,
    #[serde(rename = "expiresAt")]
    pub expires_at: i64,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// POST /api/v1/auth/login
///
/// Credentials are checked against the external credential store; a
/// verified principal gets a token with the configured default TTL.
pub async fn login(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, IdentityError> {
    let user = state
        .credentials
        .authenticate(&payload.username, &payload.password)
        .await
        .ok_or(IdentityError::InvalidCredentials)?;

    let access_token = state.issuer.issue(&user.username, &user.roles)?;
    metrics::TOKENS_ISSUED.inc();
    tracing::info!(subject = %user.username, "issued access token");

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.issuer.default_ttl_secs(),
        subject: user.username,
        roles: user.roles,
    }))
}

/// POST /api/v1/auth/validate
///
/// Remote verification endpoint for gateways that delegate instead of
/// verifying locally. Public: its callers are, by definition, not yet
/// authenticated.
pub async fn validate(
    state: web::Data<AppState>,
    payload: web::Json<ValidateRequest>,
) -> Result<HttpResponse, IdentityError> {
    let claims = state.verifier.verify_claims(&payload.token).await.map_err(|err| {
        metrics::VALIDATION_FAILURES.inc();
        tracing::debug!(reason = err.reason(), "token validation failed");
        IdentityError::Token(err)
    })?;

    Ok(HttpResponse::Ok().json(ValidateResponse {
        username: claims.sub,
        roles: claims.roles,
        expires_at: claims.exp,
    }))
}

/// POST /api/v1/auth/logout
///
/// Revokes the presented bearer token. Idempotent: logging out twice
/// with the same token succeeds both times.
pub async fn logout(
    state: web::Data<AppState>,
    token: BearerToken,
) -> Result<HttpResponse, IdentityError> {
    let claims = state.verifier.verify_claims(&token.0).await?;
    state.revocation.revoke(&token.0, claims.exp).await?;
    metrics::TOKENS_REVOKED.inc();
    tracing::info!(
        subject = %claims.sub,
        token = %&token_fingerprint(&token.0)[..12],
        "token revoked"
    );

    Ok(HttpResponse::Ok().json(LogoutResponse {
        message: "Logged out".to_string(),
    }))
}
