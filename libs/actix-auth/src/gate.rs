use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, HttpMessage,
};
use async_trait::async_trait;
use futures_util::future::LocalBoxFuture;
use token_core::{AuthError, Principal, TokenVerifier};

use crate::error::GateError;
use crate::extract::BearerToken;

/// Verification strategy the gate runs for non-public requests.
///
/// Services use [`TokenVerifier`] directly; the edge gateway plugs in a
/// delegate that decides per path between local and remote
/// verification.
#[async_trait]
pub trait VerifyToken: Send + Sync {
    async fn verify_token(&self, token: &str, path: &str) -> Result<Principal, AuthError>;
}

#[async_trait]
impl VerifyToken for TokenVerifier {
    async fn verify_token(&self, token: &str, _path: &str) -> Result<Principal, AuthError> {
        self.verify(token).await
    }
}

/// Authentication middleware: bypass public paths, verify everything
/// else, attach the [`Principal`] on success.
///
/// Per request: `Start -> {Bypass | ExtractToken}`,
/// `ExtractToken -> {Reject | Verify}`, `Verify -> {Reject | Admit}`.
/// A rejection is terminal — there are no retries at this layer.
#[derive(Clone)]
pub struct AuthGate {
    verifier: Arc<dyn VerifyToken>,
    public_paths: Arc<Vec<String>>,
}

impl AuthGate {
    pub fn new(verifier: Arc<dyn VerifyToken>, public_paths: Vec<String>) -> Self {
        AuthGate {
            verifier,
            public_paths: Arc::new(public_paths),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthGateMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGateMiddleware {
            service: Rc::new(service),
            verifier: self.verifier.clone(),
            public_paths: self.public_paths.clone(),
        }))
    }
}

pub struct AuthGateMiddleware<S> {
    service: Rc<S>,
    verifier: Arc<dyn VerifyToken>,
    public_paths: Arc<Vec<String>>,
}

impl<S, B> Service<ServiceRequest> for AuthGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let verifier = self.verifier.clone();
        let public_paths = self.public_paths.clone();

        Box::pin(async move {
            if public_paths.iter().any(|p| req.path().starts_with(p.as_str())) {
                return service.call(req).await;
            }

            // Absent header and non-Bearer schemes are both "no token".
            let token = match bearer_token(&req) {
                Some(token) => token,
                None => {
                    tracing::debug!(path = %req.path(), "rejected request without bearer token");
                    return Err(GateError::MissingToken.into());
                }
            };

            match verifier.verify_token(&token, req.path()).await {
                Ok(principal) => {
                    req.extensions_mut().insert(principal);
                    req.extensions_mut().insert(BearerToken(token));
                    service.call(req).await
                }
                Err(err) => {
                    tracing::warn!(
                        path = %req.path(),
                        reason = err.reason(),
                        "token verification failed"
                    );
                    Err(GateError::from(err).into())
                }
            }
        })
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    let token = req
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_owned())
    }
}
