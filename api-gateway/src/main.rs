use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use redis::aio::ConnectionManager;
use tracing::info;

use actix_auth::{AuthGate, RoleGuard, VerifyToken};
use api_gateway::{
    config::Config,
    delegate::DelegatingVerifier,
    metrics,
    proxy::{self, UpstreamRoutes},
    remote::RemoteVerifier,
};
use token_core::{
    MemoryRevocationStore, RedisRevocationStore, RevocationStore, TokenConfig, TokenVerifier,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "Starting API gateway on {}:{}",
        config.server.host, config.server.port
    );

    let token_config = Arc::new(
        TokenConfig::from_secret(&config.auth.token_secret, config.auth.token_ttl_secs)
            .context("Failed to build token configuration")?,
    );

    let revocation: Arc<dyn RevocationStore> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str()).context("Invalid REDIS_URL")?;
            let manager = ConnectionManager::new(client)
                .await
                .context("Failed to connect to Redis")?;
            info!("Revocation store: redis (shared with identity service)");
            Arc::new(RedisRevocationStore::new(manager, "identity"))
        }
        None => {
            info!("Revocation store: in-memory (local verification only sees local revocations)");
            Arc::new(MemoryRevocationStore::new())
        }
    };

    let local = Arc::new(TokenVerifier::new(token_config, revocation));
    let remote = Arc::new(
        RemoteVerifier::new(
            config.auth.validate_url.clone(),
            Duration::from_secs(config.auth.validate_timeout_secs),
        )
        .context("Failed to build remote verifier")?,
    );
    let verifier: Arc<dyn VerifyToken> = Arc::new(DelegatingVerifier::new(
        local,
        remote,
        config.auth.remote_verify_paths.clone(),
    ));

    let upstreams = web::Data::new(
        UpstreamRoutes::new(config.routes.clone(), Duration::from_secs(30))
            .context("Failed to build upstream client")?,
    );

    let public_paths = config.auth.public_paths.clone();
    let route_roles = config.auth.route_roles.clone();
    let bind_addr = (config.server.host.clone(), config.server.port);

    HttpServer::new(move || {
        App::new()
            .app_data(upstreams.clone())
            .wrap(RoleGuard::new(route_roles.clone()))
            .wrap(AuthGate::new(verifier.clone(), public_paths.clone()))
            .route("/health", web::get().to(health_check))
            .route("/metrics", web::get().to(metrics::metrics_handler))
            .default_service(web::route().to(proxy::forward))
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
