//! mlr-api - Main entry point
//!
//! Startup order: arguments, config file, resolved config, logging, store,
//! router, listener. Logging starts after config resolution because the
//! config file may carry the log level.

use anyhow::{Context, Result};
use clap::Parser;
use mlr_api::api::buildinfo::BuildInfo;
use mlr_api::cli::{log_filter, Args};
use mlr_api::{build_router, AppState};
use mlr_common::config::{default_config_path, load_toml_config, ServiceConfig};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let file = load_toml_config(&config_path).context("Failed to load config file")?;
    let file_found = file.is_some();
    let config = ServiceConfig::resolve(args.into_overrides(), file)
        .context("Invalid configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_filter(&config.log_level))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let build = BuildInfo::current();
    info!(
        version = %build.version,
        git_hash = %build.git_hash,
        build_timestamp = %build.build_timestamp,
        build_profile = %build.build_profile,
        "Starting mlr-api"
    );

    if file_found {
        info!(path = %config_path.display(), "Loaded config file");
    } else {
        warn!(path = %config_path.display(), "Config file not found; using defaults");
    }
    info!(
        database = %config.database.path.display(),
        max_connections = config.database.max_connections,
        call_timeout_ms = config.database.call_timeout.as_millis() as u64,
        admin = config.enable_admin,
        "Configuration resolved"
    );

    let gateway = mlr_common::db::open(&config.database)
        .await
        .context("Failed to open database")?;

    let addr = config.bind_addr();
    let app = build_router(AppState::new(gateway, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
///
/// A handler that cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
                error!(error = %e, "Failed to install SIGTERM handler");
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
