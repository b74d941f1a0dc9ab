use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use redis::aio::ConnectionManager;
use tracing::info;

use actix_auth::{AuthGate, VerifyToken};
use identity_service::{
    config::Config,
    handlers,
    metrics,
    security::SeededCredentialStore,
    AppState,
};
use token_core::{
    MemoryRevocationStore, RedisRevocationStore, RevocationStore, TokenConfig, TokenIssuer,
    TokenVerifier,
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
        "Starting identity service on {}:{}",
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
            info!("Revocation store: redis");
            Arc::new(RedisRevocationStore::new(manager, "identity"))
        }
        None => {
            info!("Revocation store: in-memory");
            Arc::new(MemoryRevocationStore::new())
        }
    };

    spawn_revocation_sweeper(
        revocation.clone(),
        Duration::from_secs(config.auth.sweep_interval_secs),
    );

    let state = AppState {
        issuer: Arc::new(TokenIssuer::new(token_config.clone())),
        verifier: Arc::new(TokenVerifier::new(token_config, revocation.clone())),
        revocation,
        credentials: Arc::new(SeededCredentialStore::new(config.auth.users.clone())),
    };

    let public_paths = config.auth.public_paths.clone();
    let bind_addr = (config.server.host.clone(), config.server.port);

    HttpServer::new(move || {
        let gate_verifier: Arc<dyn VerifyToken> = state.verifier.clone();
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(AuthGate::new(gate_verifier, public_paths.clone()))
            .route("/api/v1/auth/login", web::post().to(handlers::login))
            .route("/api/v1/auth/validate", web::post().to(handlers::validate))
            .route("/api/v1/auth/logout", web::post().to(handlers::logout))
            .route("/health", web::get().to(health_check))
            .route("/metrics", web::get().to(metrics::metrics_handler))
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}

/// Periodic out-of-request-path sweep of expired revocation entries.
fn spawn_revocation_sweeper(revocation: Arc<dyn RevocationStore>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let now = chrono::Utc::now().timestamp();
            match revocation.sweep_expired(now).await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "swept expired revocation entries"),
                Err(err) => tracing::warn!(error = %err, "revocation sweep failed"),
            }
        }
    });
}
