//! songbook-svc - music catalog service entry point

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use songbook_common::config::{
    load_toml_config, resolve_config_path, ConfigOverrides, ServiceConfig,
};
use songbook_common::db::init_database;
use tokio::signal;
use tracing::{error, info};

use songbook_svc::{build_router, logging, AppState};

/// Command-line arguments for songbook-svc
#[derive(Parser, Debug)]
#[command(name = "songbook-svc")]
#[command(about = "Music catalog service: groups, songs and paged lyrics")]
#[command(version)]
struct Args {
    /// Path to TOML config file (falls back to SONGBOOK_CONFIG, then the
    /// user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "SONGBOOK_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SONGBOOK_PORT")]
    port: Option<u16>,

    /// SQLite database file
    #[arg(short, long, env = "SONGBOOK_DATABASE")]
    database: Option<PathBuf>,

    /// Upper bound for a single storage call, in milliseconds
    #[arg(long, env = "SONGBOOK_QUERY_TIMEOUT_MS")]
    query_timeout_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SONGBOOK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Write daily log files to this directory instead of stderr
    #[arg(long, env = "SONGBOOK_LOG_DIR")]
    log_dir: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            database_path: self.database.clone(),
            query_timeout_ms: self.query_timeout_ms,
            log_level: self.log_level.clone(),
            log_dir: self.log_dir.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref());
    let toml = match config_path.as_deref() {
        Some(path) => load_toml_config(path).context("Failed to load config file")?,
        None => None,
    };
    let config = ServiceConfig::resolve(args.overrides(), toml);

    // Dropping the guard flushes the log writer, so it lives until main returns
    let _log_guard = logging::init_tracing(&config.logging)?;

    info!(
        "Starting songbook-svc v{} (git {}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE"),
    );
    match config_path.as_deref() {
        Some(path) if path.exists() => info!("Config file: {}", path.display()),
        _ => info!("No config file, using defaults"),
    }
    info!("Database: {}", config.database_path.display());

    let pool = init_database(&config.database_path, config.query_timeout_ms)
        .await
        .context("Failed to initialize database")?;

    let state = AppState::with_pool(pool, config.query_timeout_ms);
    let app = build_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Listening on http://{}", addr);

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
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install terminate handler: {}", e);
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
