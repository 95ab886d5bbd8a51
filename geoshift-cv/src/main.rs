//! geoshift-cv - clipboard coordinate converter
//!
//! Watches the clipboard for Google Maps coordinates and replaces them with
//! Yandex Maps equivalents, learning the correction from calibration pairs.
//! Control and calibration management go through a local HTTP API.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use geoshift_common::config::{load_toml_config, Overrides, Settings};
use geoshift_common::CalibrationStore;
use geoshift_cv::clipboard::SystemClipboard;
use geoshift_cv::geocode::NominatimClient;
use geoshift_cv::monitor::PollTiming;
use geoshift_cv::{build_router, AppState};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for geoshift-cv
#[derive(Parser, Debug)]
#[command(name = "geoshift-cv")]
#[command(about = "Clipboard converter from Google to Yandex map coordinates")]
#[command(version)]
struct Args {
    /// Config file (default: <config_dir>/geoshift/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Folder holding calibration.json
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "GEOSHIFT_PORT")]
    port: Option<u16>,

    /// Log level when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logged below, once the subscriber exists
    let loaded_config = load_toml_config(args.config.as_deref());
    let settings = Settings::resolve(
        &Overrides {
            data_dir: args.data_dir,
            host: args.host,
            port: args.port,
            log_level: args.log_level,
        },
        &loaded_config.config,
    );

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting GeoShift converter (geoshift-cv) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    loaded_config.log();

    settings
        .ensure_data_dir()
        .context("Failed to create data folder")?;

    let calibration_path = settings.calibration_path();
    info!("Calibration file: {}", calibration_path.display());
    let store = CalibrationStore::open(&calibration_path)
        .with_context(|| format!("Failed to load {}", calibration_path.display()))?;

    let geocoder = NominatimClient::new(
        &settings.geocoder_url,
        &settings.geocoder_language,
        settings.geocode_delay,
    )
    .context("Failed to create geocoder client")?;

    let clipboard = SystemClipboard::new().context("Failed to open the system clipboard")?;

    let state = AppState::new(
        store,
        Arc::new(clipboard),
        Arc::new(geocoder),
        PollTiming {
            poll_interval: settings.poll_interval,
            wait_timeout: settings.wait_timeout,
        },
    );
    let monitor = state.monitor.clone();
    let app = build_router(state);

    let addr = format!("{}:{}", settings.host, settings.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("geoshift-cv listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    monitor.stop().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
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
