use dbcreds::db::{PolicyStorage, TargetDatabase};
use mimalloc::MiMalloc;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &dbcreds::config::CONFIG;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        listen_addr = %cfg.basic.listen_addr,
        database_url = %cfg.basic.database_url,
        default_catalog = cfg.issuer.default_catalog.as_deref().unwrap_or("<none>"),
        default_lease_secs = cfg.issuer.default_lease().as_secs(),
        loglevel = %cfg.basic.loglevel,
    );
    if cfg.basic.api_key.is_empty() {
        warn!("DBCREDS_BASIC__API_KEY is empty; every authenticated route will reject");
    }

    let storage = PolicyStorage::connect(&cfg.basic.database_url).await?;
    let target = TargetDatabase::connect(&cfg.issuer).await?;

    let state = dbcreds::router::CredsState::new(
        storage,
        target,
        Arc::from(cfg.basic.api_key.as_str()),
        cfg.issuer.default_lease(),
    );
    let app = dbcreds::router::creds_router(state);

    let listener = TcpListener::bind(cfg.basic.listen_addr.as_str()).await?;
    info!("HTTP server listening on {}", cfg.basic.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
}
