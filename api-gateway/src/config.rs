//! Configuration for the API gateway.

use actix_auth::RoleRule;
use anyhow::{bail, Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: GatewayAuthConfig,
    /// Upstream route table, longest prefix wins.
    pub routes: Vec<RouteRule>,
    pub redis_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct GatewayAuthConfig {
    /// Same shared secret as every other verifier in the deployment.
    pub token_secret: String,
    pub token_ttl_secs: u64,
    pub public_paths: Vec<String>,
    /// Prefixes verified by the remote identity service instead of
    /// in-process.
    pub remote_verify_paths: Vec<String>,
    pub validate_url: String,
    pub validate_timeout_secs: u64,
    pub route_roles: Vec<RoleRule>,
}

/// One upstream forwarding rule.
#[derive(Debug, Clone)]
pub struct RouteRule {
    pub prefix: String,
    pub upstream: String,
}

const DEFAULT_PUBLIC_PATHS: &str = "/health,/metrics,/api/v1/auth/login,/api/v1/auth/validate";
const DEFAULT_ROUTES: &str = "/api/v1/auth=http://identity-service:8081";
const DEFAULT_VALIDATE_URL: &str = "http://identity-service:8081/api/v1/auth/validate";

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let token_secret =
            env::var("AUTH_TOKEN_SECRET").context("AUTH_TOKEN_SECRET must be set")?;

        let token_ttl_secs = env::var("AUTH_TOKEN_TTL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .context("Invalid AUTH_TOKEN_TTL_SECS")?;

        let public_paths = split_paths(
            &env::var("AUTH_PUBLIC_PATHS").unwrap_or_else(|_| DEFAULT_PUBLIC_PATHS.to_string()),
        );

        let remote_verify_paths =
            split_paths(&env::var("GATEWAY_REMOTE_VERIFY_PATHS").unwrap_or_default());

        let validate_url =
            env::var("GATEWAY_VALIDATE_URL").unwrap_or_else(|_| DEFAULT_VALIDATE_URL.to_string());

        let validate_timeout_secs = env::var("GATEWAY_VALIDATE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .context("Invalid GATEWAY_VALIDATE_TIMEOUT_SECS")?;

        let route_roles = parse_route_roles(&env::var("GATEWAY_ROUTE_ROLES").unwrap_or_default())?;

        let routes =
            parse_routes(&env::var("GATEWAY_ROUTES").unwrap_or_else(|_| DEFAULT_ROUTES.to_string()))?;

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .context("Invalid SERVER_PORT")?,
            },
            auth: GatewayAuthConfig {
                token_secret,
                token_ttl_secs,
                public_paths,
                remote_verify_paths,
                validate_url,
                validate_timeout_secs,
                route_roles,
            },
            routes,
            redis_url: env::var("REDIS_URL").ok(),
        })
    }
}

fn split_paths(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// `prefix=ROLE_A|ROLE_B` entries separated by commas.
fn parse_route_roles(raw: &str) -> Result<Vec<RoleRule>> {
    let mut rules = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (prefix, roles) = match entry.split_once('=') {
            Some((prefix, roles)) if !prefix.is_empty() && !roles.is_empty() => (prefix, roles),
            _ => bail!("Invalid GATEWAY_ROUTE_ROLES entry: expected /prefix=ROLE_A|ROLE_B"),
        };
        rules.push(RoleRule::new(
            prefix,
            roles
                .split('|')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        ));
    }
    Ok(rules)
}

/// `prefix=http://upstream` entries separated by commas.
fn parse_routes(raw: &str) -> Result<Vec<RouteRule>> {
    let mut routes = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (prefix, upstream) = match entry.split_once('=') {
            Some((prefix, upstream)) if !prefix.is_empty() && !upstream.is_empty() => {
                (prefix, upstream)
            }
            _ => bail!("Invalid GATEWAY_ROUTES entry: expected /prefix=http://host:port"),
        };
        routes.push(RouteRule {
            prefix: prefix.to_string(),
            upstream: upstream.trim_end_matches('/').to_string(),
        });
    }
    Ok(routes)
}
