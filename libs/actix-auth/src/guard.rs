use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures_util::future::LocalBoxFuture;
use token_core::Principal;

use crate::error::GateError;

/// One row of the static route authorization table.
#[derive(Debug, Clone)]
pub struct RoleRule {
    pub prefix: String,
    pub roles: Vec<String>,
}

impl RoleRule {
    pub fn new(prefix: impl Into<String>, roles: Vec<String>) -> Self {
        RoleRule {
            prefix: prefix.into(),
            roles,
        }
    }
}

/// Route authorization middleware, evaluated after [`crate::AuthGate`]
/// has admitted the request.
///
/// The longest matching path prefix wins; the Principal must hold at
/// least one of the rule's roles. A matching request with no Principal
/// at all (the gate was not stacked in front, or the path is public)
/// is rejected as unauthenticated rather than admitted.
#[derive(Clone)]
pub struct RoleGuard {
    rules: Arc<Vec<RoleRule>>,
}

impl RoleGuard {
    pub fn new(rules: Vec<RoleRule>) -> Self {
        RoleGuard {
            rules: Arc::new(rules),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RoleGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RoleGuardMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RoleGuardMiddleware {
            service: Rc::new(service),
            rules: self.rules.clone(),
        }))
    }
}

pub struct RoleGuardMiddleware<S> {
    service: Rc<S>,
    rules: Arc<Vec<RoleRule>>,
}

impl<S, B> Service<ServiceRequest> for RoleGuardMiddleware<S>
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
        let rules = self.rules.clone();

        Box::pin(async move {
            let matched = rules
                .iter()
                .filter(|rule| req.path().starts_with(rule.prefix.as_str()))
                .max_by_key(|rule| rule.prefix.len())
                .cloned();

            if let Some(rule) = matched {
                let denied = {
                    let extensions = req.extensions();
                    match extensions.get::<Principal>() {
                        Some(principal)
                            if rule.roles.iter().any(|role| principal.has_role(role)) =>
                        {
                            None
                        }
                        Some(principal) => {
                            Some((GateError::InsufficientRole, principal.subject.clone()))
                        }
                        None => Some((GateError::MissingToken, String::new())),
                    }
                };

                if let Some((err, subject)) = denied {
                    tracing::warn!(
                        path = %req.path(),
                        subject = %subject,
                        required = ?rule.roles,
                        "route authorization denied"
                    );
                    return Err(err.into());
                }
            }

            service.call(req).await
        })
    }
}
