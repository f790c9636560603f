//! Tenantgate Domain Resolver binary

use std::sync::Arc;

use anyhow::Context;
use tenantgate_resolver::config::LogFormat;
use tenantgate_resolver::{server, AppState, Config, DomainStore, RedisDomainStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is normal outside local development
    let _ = dotenvy::dotenv();

    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.log_format);

    tracing::info!(
        bind_address = %config.bind_address,
        host_policy = %config.host_policy,
        "Starting tenant resolver"
    );

    let connection_info = config.redis.connection_info()?;
    let store = Arc::new(RedisDomainStore::open(connection_info, config.redis.timeouts)?);

    // Boot even when Redis is down; readiness keeps traffic away until it is up
    match store.ping().await {
        Ok(()) => tracing::info!("Successfully connected to Redis"),
        Err(err) => tracing::warn!(error = %err, "Unable to connect to Redis"),
    }

    let state = AppState::new(config, store);
    server::run(state).await
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}
