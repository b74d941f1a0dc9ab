use actix_auth::ErrorBody;
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Forwarding failures. Authentication/authorization rejections are
/// raised by the middleware as [`actix_auth::GateError`] before a
/// request ever reaches the proxy.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("No upstream route for path")]
    NoRoute,

    #[error("Upstream request failed")]
    Upstream(String),
}

impl GatewayError {
    fn detail(&self) -> &'static str {
        match self {
            GatewayError::NoRoute => "NO_ROUTE",
            GatewayError::Upstream(_) => "BAD_GATEWAY",
        }
    }
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::NoRoute => StatusCode::NOT_FOUND,
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let GatewayError::Upstream(reason) = self {
            tracing::error!(reason = %reason, "upstream request failed");
        }
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorBody {
            status: status.as_u16(),
            message: self.to_string(),
            detail: self.detail().to_string(),
        })
    }
}
