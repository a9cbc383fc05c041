//! # PetClinic App
//!
//! Application layer: wiring and the process entry point.
//!
//! This crate contains:
//! - Application context (dependency injection)
//! - Logging setup and the run loop used by the binary
//!
//! ## Architecture
//! - Depends on `common`, `core` and `infra`
//! - The only crate that reports errors with `anyhow`

pub mod context;
pub mod logging;

use anyhow::Context as _;

pub use context::AppContext;

/// Start every enabled feature and run until Ctrl-C
///
/// # Errors
///
/// Fails if configuration cannot be loaded or a scheduler cannot start.
pub async fn run() -> anyhow::Result<()> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::info!(path = %path.display(), "Loaded .env"),
        Err(e) => tracing::debug!(error = %e, "No .env file loaded"),
    }

    let config = petclinic_infra::config::load().context("failed to load configuration")?;
    tracing::info!(?config, "PetClinic starting...");

    let mut ctx = AppContext::new(config).context("failed to build application context")?;
    ctx.start().await.context("failed to start schedulers")?;

    let report = ctx.spawn_care_report();

    tokio::signal::ctrl_c().await.context("failed to listen for Ctrl-C")?;
    tracing::info!("Shutdown requested");

    ctx.shutdown().await;
    if let Some(report) = report {
        match report.await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "Care tips report not completed"),
            Err(e) => tracing::error!(error = %e, "Care tips task panicked"),
        }
    }

    tracing::info!("PetClinic stopped");
    Ok(())
}
