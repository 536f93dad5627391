//! Leasehold Server — Application entry point.
//!
//! Connects to the store, applies migrations and audits apartment
//! occupancy against the tenancy records before serving.

mod config;

use leasehold_core::error::LeaseholdError;
use leasehold_db::{DbError, DbManager};
use leasehold_tenancy::TenancyCoordinator;
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, ServerConfig};

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Tenancy(#[from] LeaseholdError),
    #[error("Failed to listen for shutdown signal: {0}")]
    Signal(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("leasehold=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .init();

    info!("Starting Leasehold server...");

    if let Err(e) = run().await {
        error!(error = %e, "Leasehold server failed");
        std::process::exit(1);
    }

    info!("Leasehold server stopped.");
}

async fn run() -> Result<(), StartupError> {
    let config = ServerConfig::from_env()?;

    let db = DbManager::connect(&config.db).await?;
    db.migrate().await?;

    let coordinator = TenancyCoordinator::new(
        db.apartments(),
        db.tenancies(),
        db.users(),
        config.tenancy,
    );

    let findings = coordinator.audit_occupancy().await?;
    for report in &findings {
        warn!(
            apartment_id = %report.apartment_id,
            recorded = report.recorded,
            actual = report.actual,
            max_occupants = report.max_occupants,
            repaired = report.repaired,
            "Occupancy inconsistency found at startup"
        );
    }

    info!(
        compensate_failed_writes = coordinator.config().compensate_failed_writes,
        "Ready"
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    Ok(())
}
