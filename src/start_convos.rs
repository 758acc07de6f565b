//! Startup helpers for the convos server.

use std::process::ExitCode;
use std::sync::Arc;

use crate::convos::core::config::ConvosConfig;
use crate::server::{self, AppState};

/// Run the server until Ctrl+C (used by the `convos-server` binary).
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting convos v{}", env!("CARGO_PKG_VERSION"));

    let config = match ConvosConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let result = rt.block_on(async {
        let state = initialize(&config).await?;
        server::run_server_with_shutdown(state, config.server.port, shutdown_signal())
            .await
    });

    if let Err(e) = result {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Initialize application state without starting the server.
///
/// # Errors
/// Returns an error if storage cannot be opened.
pub async fn initialize(
    config: &ConvosConfig,
) -> Result<Arc<AppState>, Box<dyn std::error::Error + Send + Sync>> {
    tracing::info!("Database: {}", config.storage.sqlite_path.display());

    AppState::new(&config.storage)
        .await
        .map_err(|e| format!("Failed to create state: {e}").into())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
