//! XenForo bridge bot - main entry point.

use anyhow::Context;
use bridge_bot::commands::Dispatcher;
use bridge_bot::config::ConfigHandle;
use bridge_bot::server::{create_router, AppState};
use napcat_client::NapCatClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config_path =
        std::env::var("BRIDGE_CONFIG").unwrap_or_else(|_| "config.json".into());
    let config = Arc::new(
        ConfigHandle::load_or_create(&config_path).context("Failed to load configuration")?,
    );
    let cfg = config.current().await;

    init_logging(&cfg.log_level);

    info!("Starting XenForo bridge bot...");

    let chat = Arc::new(
        NapCatClient::new(&cfg.napcat_url, Duration::from_secs(cfg.request_timeout))
            .context("Failed to create NapCat client")?,
    );

    if chat.health_check().await {
        info!("NapCat healthy at {}", cfg.napcat_url);
    } else {
        warn!("NapCat not reachable at {} - replies will fail until it is up", cfg.napcat_url);
    }

    if cfg.xf_url.is_empty() || cfg.xf_api_key.is_empty() {
        warn!(
            "Forum API not configured; commands will ask for {} to be filled in",
            config.path().display()
        );
    } else {
        info!("Forum: {}", cfg.xf_url);
    }

    let dispatcher = Arc::new(Dispatcher::new(config.clone()));
    info!("Registered {} command handlers", dispatcher.handler_count());

    let state = AppState {
        config: config.clone(),
        chat,
        dispatcher,
    };
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", cfg.listen_addr))?;
    info!("Listening on {}", cfg.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
