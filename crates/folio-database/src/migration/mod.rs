//! Schema migrations.
//!
//! Migrations are identified by a sortable 16-digit timestamp
//! (`YYYYMMDDHHMMSSNN`). The store keeps a single cursor, the timestamp of
//! the newest applied migration; everything after it is pending. Each
//! migration runs in its own transaction together with the cursor update,
//! so a crash never leaves a half-applied migration behind.

mod builtin;
mod definition;
mod error;
mod memory;
mod postgres;
mod runner;
mod schema;
mod store;
mod timestamp;

use sqlx::PgPool;
use tracing::info;

use folio_core::config::MigrationConfig;
use folio_core::error::AppError;

pub use builtin::builtin_migrations;
pub use definition::{Migration, SqlMigration};
pub use error::MigrationError;
pub use memory::MemoryMigrationStore;
pub use postgres::{CURSOR_KEY, PgMigrationStore};
pub use runner::{MigrationReport, MigrationRunner, MigrationState, MigrationStatus};
pub use schema::BASE_SCHEMA;
pub use store::{InstallationState, MigrationStore, MigrationTx};
pub use timestamp::{MigrationId, MigrationTimestamp};

/// Brings the database schema up to date with the built-in migrations.
pub async fn run_migrations(pool: &PgPool, config: &MigrationConfig) -> Result<MigrationReport, AppError> {
    info!("Running database migrations");

    let runner = MigrationRunner::new(builtin_migrations()?)?.with_apply_timeout(config.apply_timeout());
    let store = PgMigrationStore::new(pool.clone());
    let report = runner.run(&store).await?;

    info!(
        applied = report.applied.len(),
        cursor = %report.cursor_after,
        "Database migrations completed"
    );
    Ok(report)
}

/// Migration status against the live database, for the CLI.
pub async fn migration_status(pool: &PgPool) -> Result<(Option<MigrationTimestamp>, Vec<MigrationStatus>), AppError> {
    let runner = MigrationRunner::new(builtin_migrations()?)?;
    let store = PgMigrationStore::new(pool.clone());
    Ok(runner.status(&store).await?)
}
