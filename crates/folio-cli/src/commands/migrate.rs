//! Database migration management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::Printer;
use folio_core::config::AppConfig;
use folio_core::error::AppError;
use folio_database::migration::{self, InstallationState};

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Apply every migration newer than the stored cursor
    Run,
    /// Show which known migrations are behind the cursor
    Status,
}

#[derive(Debug, Serialize, Tabled)]
struct StatusRow {
    #[tabled(rename = "Migration")]
    id: String,
    #[tabled(rename = "State")]
    state: &'static str,
}

/// Execute migration commands
pub async fn execute(
    args: &MigrateArgs,
    config: &AppConfig,
    out: Printer,
) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;

    let result = match &args.command {
        MigrateCommand::Run => run(&pool, config, out).await,
        MigrateCommand::Status => status(&pool, out).await,
    };
    pool.close().await;
    result
}

async fn run(
    pool: &folio_database::DatabasePool,
    config: &AppConfig,
    out: Printer,
) -> Result<(), AppError> {
    let report = migration::run_migrations(pool.pool(), &config.migrations).await?;

    match report.bootstrapped {
        Some(InstallationState::Fresh) => {
            out.success("Fresh install: base schema created.");
        }
        Some(InstallationState::Legacy) => {
            out.warning("Existing schema without a cursor: every migration was considered pending.");
        }
        _ => {}
    }
    for id in &report.applied {
        out.field("applied", &id.to_string());
    }
    out.field("cursor", &report.cursor_after.to_string());
    out.success(&format!("{} migration(s) applied.", report.applied.len()));
    Ok(())
}

async fn status(pool: &folio_database::DatabasePool, out: Printer) -> Result<(), AppError> {
    let (cursor, statuses) = migration::migration_status(pool.pool()).await?;

    match cursor {
        Some(cursor) => out.field("cursor", &cursor.to_string()),
        None => out.warning("No migration cursor stored yet."),
    }
    let rows: Vec<StatusRow> = statuses
        .into_iter()
        .map(|s| StatusRow {
            id: s.id.to_string(),
            state: if s.applied { "applied" } else { "pending" },
        })
        .collect();
    out.list(&rows);
    Ok(())
}
