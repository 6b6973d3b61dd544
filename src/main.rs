//! Garage Sim - headless dashboard simulator
//!
//! Reads host UI events as JSON lines on stdin and streams dashboard
//! snapshots as JSON lines on stdout. Logs go to stderr.

use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use garage_sim::app::AppState;
use garage_sim::config::Config;
use garage_sim::util::time::{init_process_time, uptime_secs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level, config.log_json);

    init_process_time();

    info!("Starting Garage Sim");

    // Catalog and parked simulation
    let state = AppState::new(config)?;
    info!(
        session_id = %state.controller.session_id(),
        vehicles = state.catalog.len(),
        tick_ms = state.config.tick_interval.as_millis() as u64,
        "Simulation ready"
    );

    // Ticker lives as long as this handle
    let ticker = state.controller.start()?;
    let bridge = state.host_bridge();

    let interrupted = tokio::select! {
        result = bridge.run(BufReader::new(tokio::io::stdin()), tokio::io::stdout()) => {
            result?;
            false
        }
        _ = shutdown_signal() => true,
    };

    ticker.stop().await;

    info!(uptime_secs = uptime_secs(), "Garage Sim shutdown complete");

    if interrupted {
        // A blocked stdin read would keep the runtime from shutting down
        std::process::exit(0);
    }
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str, json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    // stdout carries the dashboard stream
    let text_layer = (!json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
    });
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(text_layer)
        .with(json_layer)
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        }
    }
}
