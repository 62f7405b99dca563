//! Murmur audio orchestrator - main entry point
//!
//! Composes the orchestration service and runs its command loop until a
//! shutdown signal arrives. Backend registration is the platform's job:
//! deployments embed [`murmur_audio`] as a library and hand
//! [`BackendRegistry::new`] their backend instances; this binary starts
//! with an empty registry and exists for the standalone service setup.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use murmur_audio::config::AudioConfig;
use murmur_audio::events::EventBus;
use murmur_audio::registry::BackendRegistry;
use murmur_audio::service::AudioService;

/// Command-line arguments for murmur-audio
#[derive(Parser, Debug)]
#[command(name = "murmur-audio")]
#[command(about = "Audio playback orchestrator for the Murmur voice assistant")]
#[command(version)]
struct Args {
    /// Path to the TOML configuration file (falls back to the
    /// MURMUR_AUDIO_CONFIG environment variable, then the per-user
    /// config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "murmur_audio=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = AudioConfig::load(args.config.as_deref())
        .context("Failed to load configuration")?;
    info!(?config, "Starting Murmur audio orchestrator");

    let registry = Arc::new(BackendRegistry::new(
        Vec::new(),
        config.default_backend.as_deref(),
    ));
    if registry.is_empty() {
        warn!("no playback backends registered; playback commands will be no-ops");
    }

    let bus = Arc::new(EventBus::new(config.event_bus_capacity));
    let service = AudioService::new(Arc::clone(&registry), Arc::clone(&bus), &config, None);

    // Transport adapters clone this sender to deliver commands.
    let (command_tx, command_rx) = mpsc::channel(64);
    let loop_handle = tokio::spawn(Arc::clone(&service).run(command_rx));

    shutdown_signal().await;

    service.shutdown();
    drop(command_tx);
    loop_handle.await.context("Command loop panicked")?;

    info!("Shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
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
