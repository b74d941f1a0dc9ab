//! Prefix-routed forwarding to upstream services.

use std::time::Duration;

use actix_web::{http::StatusCode, web, HttpMessage, HttpRequest, HttpResponse};
use reqwest::header::{HeaderName, HeaderValue};
use token_core::Principal;

use crate::config::RouteRule;
use crate::error::GatewayError;
use crate::metrics;

/// Headers that must not cross the proxy boundary, plus the identity
/// headers the gateway itself owns — inbound copies of those are
/// dropped so a client can never spoof them.
const SKIPPED_REQUEST_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
    "x-auth-subject",
    "x-auth-roles",
];

const SKIPPED_RESPONSE_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "transfer-encoding",
    "upgrade",
    "content-length",
];

pub struct UpstreamRoutes {
    routes: Vec<RouteRule>,
    http: reqwest::Client,
}

impl UpstreamRoutes {
    pub fn new(routes: Vec<RouteRule>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(UpstreamRoutes { routes, http })
    }

    fn match_route(&self, path: &str) -> Option<&RouteRule> {
        self.routes
            .iter()
            .filter(|route| path.starts_with(route.prefix.as_str()))
            .max_by_key(|route| route.prefix.len())
    }
}

/// Default service of the gateway: every admitted request that is not
/// handled at the edge is forwarded to the matching upstream.
///
/// The original `Authorization` header travels with the request so the
/// upstream can re-verify the bearer itself; `X-Auth-Subject` and
/// `X-Auth-Roles` carry the identity the gateway derived.
pub async fn forward(
    req: HttpRequest,
    body: web::Bytes,
    routes: web::Data<UpstreamRoutes>,
) -> Result<HttpResponse, GatewayError> {
    let route = routes.match_route(req.path()).ok_or(GatewayError::NoRoute)?;

    let mut url = format!("{}{}", route.upstream, req.path());
    if let Some(query) = req.uri().query() {
        url.push('?');
        url.push_str(query);
    }

    let method = reqwest::Method::from_bytes(req.method().as_str().as_bytes())
        .map_err(|_| GatewayError::Upstream("unsupported method".to_string()))?;

    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let mut upstream = routes.http.request(method, &url);

    for (name, value) in req.headers() {
        if SKIPPED_REQUEST_HEADERS.contains(&name.as_str()) {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_str().as_bytes()),
            HeaderValue::from_bytes(value.as_bytes()),
        ) {
            upstream = upstream.header(name, value);
        }
    }

    if let Some(principal) = req.extensions().get::<Principal>() {
        let mut roles: Vec<&str> = principal.roles.iter().map(String::as_str).collect();
        roles.sort_unstable();
        upstream = upstream
            .header("X-Auth-Subject", principal.subject.as_str())
            .header("X-Auth-Roles", roles.join(","));
    }
    upstream = upstream.header("X-Request-Id", request_id.as_str());

    let response = upstream.body(body.to_vec()).send().await.map_err(|e| {
        metrics::UPSTREAM_FAILURES.inc();
        GatewayError::Upstream(e.to_string())
    })?;

    metrics::REQUESTS_FORWARDED.inc();
    tracing::debug!(
        path = %req.path(),
        status = %response.status(),
        request_id = %request_id,
        "forwarded request"
    );

    let status = StatusCode::from_u16(response.status().as_u16())
        .map_err(|_| GatewayError::Upstream("invalid upstream status".to_string()))?;
    let mut builder = HttpResponse::build(status);
    for (name, value) in response.headers() {
        if SKIPPED_RESPONSE_HEADERS.contains(&name.as_str()) {
            continue;
        }
        builder.insert_header((name.as_str(), value.as_bytes()));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| GatewayError::Upstream(e.to_string()))?;
    Ok(builder.body(bytes.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routes(entries: &[(&str, &str)]) -> UpstreamRoutes {
        UpstreamRoutes::new(
            entries
                .iter()
                .map(|(prefix, upstream)| RouteRule {
                    prefix: prefix.to_string(),
                    upstream: upstream.to_string(),
                })
                .collect(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn longest_prefix_wins() {
        let routes = routes(&[
            ("/api", "http://core:9000"),
            ("/api/v1/auth", "http://identity:8081"),
        ]);
        assert_eq!(
            routes.match_route("/api/v1/auth/login").unwrap().upstream,
            "http://identity:8081"
        );
        assert_eq!(
            routes.match_route("/api/v1/orders").unwrap().upstream,
            "http://core:9000"
        );
    }

    #[test]
    fn unmatched_path_has_no_route() {
        let routes = routes(&[("/api", "http://core:9000")]);
        assert!(routes.match_route("/other").is_none());
    }
}
