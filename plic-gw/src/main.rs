//! plic-gw - Pakistan Localization Image Checker gateway
//!
//! Serves the single-page checker UI and the analysis endpoint.
//!
//! Startup order:
//! 1. Parse command line
//! 2. Load TOML config (missing file → defaults)
//! 3. Initialize tracing at the configured level
//! 4. Resolve the provider credential (absent → service starts degraded)
//! 5. Serve until Ctrl+C / SIGTERM

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use plic_common::config::{resolve_config_path, resolve_credential, TomlConfig};
use plic_gw::{build_router, AnalysisGateway, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for plic-gw
#[derive(Parser, Debug)]
#[command(name = "plic-gw")]
#[command(about = "Pakistan Localization Image Checker gateway")]
#[command(version)]
struct Args {
    /// TOML config file (default: PLIC_CONFIG, then the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind (overrides [server].host)
    #[arg(long, env = "PLIC_HOST")]
    host: Option<String>,

    /// Port to listen on (overrides [server].port)
    #[arg(short, long, env = "PLIC_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref());
    let config_found = config_path.exists();
    let config = TomlConfig::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("plic_gw={0},plic_common={0},tower_http=info", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before anything that can be slow or fail
    info!(
        "Starting plic-gw v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    if config_found {
        info!("Loaded configuration from {}", config_path.display());
    } else {
        warn!(
            "Config file {} not found, using built-in defaults",
            config_path.display()
        );
    }

    let credential = resolve_credential(&config.provider);
    if !credential.is_configured() {
        warn!("Starting without a provider API key; analysis requests will fail until one is configured");
    }

    let gateway = AnalysisGateway::from_config(&config.provider, credential)
        .context("Failed to initialize provider client")?;
    info!(
        endpoint = gateway.provider().endpoint(),
        model = gateway.provider().model(),
        "Provider client ready"
    );

    let state = AppState::new(gateway, config.server.max_body_bytes);
    let app = build_router(state);

    let host = args.host.unwrap_or(config.server.host);
    let port = args.port.unwrap_or(config.server.port);
    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind to {}:{}", host, port))?;
    let addr: SocketAddr = listener.local_addr()?;
    info!("plic-gw listening on http://{}", addr);
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
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
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
