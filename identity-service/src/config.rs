//! Configuration for the identity service.
//!
//! Everything is loaded from environment variables (plus a local
//! `.env` in development). The signing secret is required; everything
//! else has a sensible default.

use anyhow::{bail, Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    /// When set, the revocation store is Redis-backed and shared with
    /// every other verifier pointed at the same instance.
    pub redis_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Base64-encoded HMAC key material, shared by every service that
    /// verifies tokens.
    pub token_secret: String,
    pub token_ttl_secs: u64,
    /// Path prefixes served without authentication.
    pub public_paths: Vec<String>,
    /// Seeded credential entries, `user:password:ROLE_A|ROLE_B`.
    pub users: Vec<UserEntry>,
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone)]
pub struct UserEntry {
    pub username: String,
    pub password: String,
    pub roles: Vec<String>,
}

const DEFAULT_PUBLIC_PATHS: &str = "/health,/metrics,/api/v1/auth/login,/api/v1/auth/validate";

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let token_secret =
            env::var("AUTH_TOKEN_SECRET").context("AUTH_TOKEN_SECRET must be set")?;

        let token_ttl_secs = env::var("AUTH_TOKEN_TTL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .context("Invalid AUTH_TOKEN_TTL_SECS")?;

        let public_paths = env::var("AUTH_PUBLIC_PATHS")
            .unwrap_or_else(|_| DEFAULT_PUBLIC_PATHS.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let users = parse_users(&env::var("AUTH_USERS").unwrap_or_default())?;

        let sweep_interval_secs = env::var("AUTH_SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse()
            .context("Invalid AUTH_SWEEP_INTERVAL_SECS")?;

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "8081".to_string())
                    .parse()
                    .context("Invalid SERVER_PORT")?,
            },
            auth: AuthConfig {
                token_secret,
                token_ttl_secs,
                public_paths,
                users,
                sweep_interval_secs,
            },
            redis_url: env::var("REDIS_URL").ok(),
        })
    }
}

fn parse_users(raw: &str) -> Result<Vec<UserEntry>> {
    let mut users = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let mut fields = entry.splitn(3, ':');
        let (username, password, roles) = match (fields.next(), fields.next(), fields.next()) {
            (Some(u), Some(p), Some(r)) if !u.is_empty() && !p.is_empty() => (u, p, r),
            _ => bail!("Invalid AUTH_USERS entry: expected user:password:ROLE_A|ROLE_B"),
        };
        users.push(UserEntry {
            username: username.to_string(),
            password: password.to_string(),
            roles: roles
                .split('|')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        });
    }
    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn parse_users_accepts_multiple_entries() {
        let users =
            parse_users("alice:wonderland:ROLE_USER|ROLE_ADMIN,bob:builder:ROLE_USER").unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "alice");
        assert_eq!(users[0].roles, vec!["ROLE_USER", "ROLE_ADMIN"]);
        assert_eq!(users[1].username, "bob");
        assert_eq!(users[1].roles, vec!["ROLE_USER"]);
    }

    #[test]
    fn parse_users_accepts_empty_input() {
        assert!(parse_users("").unwrap().is_empty());
    }

    #[test]
    fn parse_users_rejects_entries_without_roles_field() {
        assert!(parse_users("alice:wonderland").is_err());
    }

    #[test]
    #[serial]
    fn config_defaults_apply() {
        env::set_var("AUTH_TOKEN_SECRET", "c2VjcmV0LW1hdGVyaWFs");
        env::remove_var("AUTH_TOKEN_TTL_SECS");
        env::remove_var("AUTH_PUBLIC_PATHS");
        env::remove_var("SERVER_PORT");

        let config = Config::from_env().unwrap();
        assert_eq!(config.auth.token_ttl_secs, 3600);
        assert_eq!(config.server.port, 8081);
        assert!(config
            .auth
            .public_paths
            .contains(&"/api/v1/auth/login".to_string()));

        env::remove_var("AUTH_TOKEN_SECRET");
    }

    #[test]
    #[serial]
    fn missing_secret_is_an_error() {
        env::remove_var("AUTH_TOKEN_SECRET");
        assert!(Config::from_env().is_err());
    }
}
