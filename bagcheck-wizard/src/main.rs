//! bagcheck-wizard - Handbag verification wizard service
//!
//! Hosts guided capture sessions over HTTP: the client uploads one photo per
//! part, the service classifies the material photo and reports a verdict.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use bagcheck_common::config::{ConfigOverrides, ServiceConfig};
use bagcheck_common::events::EventBus;
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bagcheck_wizard::services::{ClassificationClient, ScoreAggregator, Verifier};
use bagcheck_wizard::AppState;

/// Event bus capacity; progress ticks dominate the traffic
const EVENT_BUS_CAPACITY: usize = 256;

/// Command-line arguments for bagcheck-wizard
#[derive(Parser, Debug)]
#[command(name = "bagcheck-wizard")]
#[command(about = "Handbag authenticity verification wizard service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "BAGCHECK_PORT")]
    port: Option<u16>,

    /// TOML configuration file
    #[arg(short, long, env = "BAGCHECK_CONFIG")]
    config: Option<PathBuf>,

    /// Primary classification endpoint
    #[arg(long, env = "BAGCHECK_PRIMARY_URL")]
    primary_url: Option<String>,

    /// Fallback classification endpoint
    #[arg(long, env = "BAGCHECK_SECONDARY_URL")]
    secondary_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bagcheck_wizard=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = ServiceConfig::resolve(ConfigOverrides {
        config_path: args.config,
        port: args.port,
        primary_url: args.primary_url,
        secondary_url: args.secondary_url,
    })
    .context("Failed to resolve configuration")?;

    info!("Starting bagcheck-wizard v{}", env!("CARGO_PKG_VERSION"));
    info!(primary = %config.primary_url, secondary = %config.secondary_url, "Classification endpoints");

    let client = ClassificationClient::new(&config.primary_url, &config.secondary_url)
        .context("Failed to build classification client")?;
    let verifier = Arc::new(Verifier::new(Arc::new(client), ScoreAggregator::default()));

    let event_bus = EventBus::new(EVENT_BUS_CAPACITY);
    let state = AppState::new(&config, verifier, event_bus);
    let app = bagcheck_wizard::build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
