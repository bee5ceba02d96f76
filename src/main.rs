use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use turnstile::config::{LogFormat, TurnstileConfig};
use turnstile::http::HttpServer;
use turnstile::ratelimit::{AdmissionService, LimiterKind, LIMIT, WINDOW_MS};

/// Per-client admission control over fixed and sliding windows.
#[derive(Debug, Parser)]
#[command(name = "turnstile", version, about)]
struct Cli {
    /// Configuration file (YAML, TOML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the HTTP bind address
    #[arg(long)]
    http_addr: Option<SocketAddr>,

    /// Override the log format
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = TurnstileConfig::load(cli.config.as_deref())?;
    config.apply_overrides(cli.http_addr, cli.log_format);

    init_tracing(&config);

    info!("Starting Turnstile Admission Control Service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!(http_addr = %config.server.http_addr, "Configuration loaded");

    let fixed = Arc::new(AdmissionService::new(LimiterKind::Fixed));
    let sliding = Arc::new(AdmissionService::new(LimiterKind::Sliding));
    info!(limit = LIMIT, window_ms = WINDOW_MS, "Admission services initialized");

    let http_server = HttpServer::new(config.server.http_addr, fixed, sliding);

    // Run the server with graceful shutdown on Ctrl+C
    http_server
        .serve_with_shutdown(shutdown_signal())
        .await?;

    info!("Turnstile Admission Control Service stopped");
    Ok(())
}

fn init_tracing(config: &TurnstileConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    match config.logging.format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_target(false).with_thread_ids(true))
            .init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_thread_ids(true))
            .init(),
    }
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
