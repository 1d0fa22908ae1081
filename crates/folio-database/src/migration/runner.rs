//! Migration runner.
//!
//! Each pending migration moves through:
//!
//! ```text
//! PENDING -> APPLYING -> APPLIED
//!                |
//!                v
//!           ROLLING_BACK -> ROLLED_BACK
//!                |
//!                v
//!           ROLLBACK_FAILED
//! ```
//!
//! The first failure stops the run; later migrations are not attempted.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use folio_core::{AppError, AppResult};

use super::definition::Migration;
use super::error::MigrationError;
use super::store::{InstallationState, MigrationStore, MigrationTx};
use super::timestamp::{MigrationId, MigrationTimestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationState {
    Pending,
    Applying,
    Applied,
    RollingBack,
    RolledBack,
    RollbackFailed,
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "PENDING",
            Self::Applying => "APPLYING",
            Self::Applied => "APPLIED",
            Self::RollingBack => "ROLLING_BACK",
            Self::RolledBack => "ROLLED_BACK",
            Self::RollbackFailed => "ROLLBACK_FAILED",
        })
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct MigrationReport {
    /// Set when this run initialised the cursor.
    pub bootstrapped: Option<InstallationState>,
    pub cursor_before: MigrationTimestamp,
    pub cursor_after: MigrationTimestamp,
    /// Migrations applied, in order.
    pub applied: Vec<MigrationId>,
}

/// Whether a known migration is behind the cursor.
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    pub id: MigrationId,
    pub applied: bool,
}

/// Applies migrations newer than the stored cursor, oldest first.
#[derive(Debug)]
pub struct MigrationRunner {
    migrations: Vec<Arc<dyn Migration>>,
    apply_timeout: Option<Duration>,
}

impl MigrationRunner {
    /// Sorts `migrations` by timestamp. Two migrations may not share one.
    pub fn new(mut migrations: Vec<Arc<dyn Migration>>) -> Result<Self, MigrationError> {
        migrations.sort_by(|a, b| a.id().timestamp.cmp(&b.id().timestamp));

        if let Some(pair) = migrations
            .windows(2)
            .find(|pair| pair[0].id().timestamp == pair[1].id().timestamp)
        {
            return Err(MigrationError::Invalid(format!(
                "Migrations {} and {} share a timestamp",
                pair[0].id(),
                pair[1].id()
            )));
        }
        if let Some(sentinel) = migrations.iter().find(|m| m.id().timestamp.is_sentinel()) {
            return Err(MigrationError::Invalid(format!(
                "Migration {} uses the reserved timestamp {}",
                sentinel.id(),
                MigrationTimestamp::SENTINEL
            )));
        }

        Ok(Self {
            migrations,
            apply_timeout: None,
        })
    }

    /// Limits how long a single `apply` may run. Overrunning counts as a
    /// failure and triggers rollback.
    pub fn with_apply_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.apply_timeout = timeout;
        self
    }

    /// All known migrations, oldest first.
    pub fn migrations(&self) -> &[Arc<dyn Migration>] {
        &self.migrations
    }

    /// Migrations strictly newer than `cursor`, oldest first.
    pub fn pending(&self, cursor: MigrationTimestamp) -> Vec<Arc<dyn Migration>> {
        self.migrations
            .iter()
            .filter(|m| m.id().timestamp > cursor)
            .cloned()
            .collect()
    }

    /// Cursor plus per-migration applied flags. Does not bootstrap.
    pub async fn status(
        &self,
        store: &dyn MigrationStore,
    ) -> Result<(Option<MigrationTimestamp>, Vec<MigrationStatus>), MigrationError> {
        let cursor = store.read_cursor().await.map_err(MigrationError::Store)?;
        let statuses = self
            .migrations
            .iter()
            .map(|m| MigrationStatus {
                id: m.id().clone(),
                applied: cursor.is_some_and(|c| m.id().timestamp <= c),
            })
            .collect();
        Ok((cursor, statuses))
    }

    /// Initialises the cursor if the store has none, and returns it.
    ///
    /// A fresh database gets the base schema and a cursor of "now", so no
    /// historical migration runs against it. A legacy database gets the
    /// sentinel cursor, so every migration runs.
    pub async fn bootstrap(
        &self,
        store: &dyn MigrationStore,
    ) -> Result<(MigrationTimestamp, Option<InstallationState>), MigrationError> {
        let state = store.installation_state().await.map_err(MigrationError::Store)?;
        let cursor = match state {
            InstallationState::Managed(cursor) => return Ok((cursor, None)),
            InstallationState::Fresh => {
                let now = MigrationTimestamp::now();
                let cursor = self
                    .migrations
                    .last()
                    .map_or(now, |newest| newest.id().timestamp.max(now));
                info!(cursor = %cursor, "Fresh installation, creating base schema");

                let mut tx = store.begin().await.map_err(MigrationError::Store)?;
                let outcome = match store.create_base_schema(&mut *tx).await {
                    Ok(()) => tx.set_cursor(&cursor).await,
                    Err(e) => Err(e),
                };
                finish(tx, outcome).await.map_err(MigrationError::Store)?;
                cursor
            }
            InstallationState::Legacy => {
                let cursor = MigrationTimestamp::SENTINEL;
                warn!(
                    cursor = %cursor,
                    "Existing installation without a migration cursor, every migration will run"
                );

                let mut tx = store.begin().await.map_err(MigrationError::Store)?;
                let outcome = tx.set_cursor(&cursor).await;
                finish(tx, outcome).await.map_err(MigrationError::Store)?;
                cursor
            }
        };
        Ok((cursor, Some(state)))
    }

    /// Bootstraps, then applies every pending migration in order.
    pub async fn run(&self, store: &dyn MigrationStore) -> Result<MigrationReport, MigrationError> {
        let (cursor, bootstrapped) = self.bootstrap(store).await?;
        let pending = self.pending(cursor);

        let mut report = MigrationReport {
            bootstrapped,
            cursor_before: cursor,
            cursor_after: cursor,
            applied: Vec::new(),
        };

        if pending.is_empty() {
            info!(cursor = %cursor, "Schema is up to date");
            return Ok(report);
        }
        info!(cursor = %cursor, pending = pending.len(), "Applying migrations");

        for migration in pending {
            self.apply_one(store, migration.as_ref()).await?;
            report.cursor_after = migration.id().timestamp;
            report.applied.push(migration.id().clone());
        }

        Ok(report)
    }

    async fn apply_one(&self, store: &dyn MigrationStore, migration: &dyn Migration) -> Result<(), MigrationError> {
        let id = migration.id();
        transition(id, MigrationState::Pending, MigrationState::Applying);

        let mut tx = store.begin().await.map_err(MigrationError::Store)?;
        let outcome = self.apply_and_advance(migration, &mut *tx).await;
        match finish(tx, outcome).await {
            Ok(()) => {
                transition(id, MigrationState::Applying, MigrationState::Applied);
                info!(migration = %id, "Migration applied");
                Ok(())
            }
            Err(cause) => {
                warn!(migration = %id, error = %cause, "Migration failed, rolling back");
                transition(id, MigrationState::Applying, MigrationState::RollingBack);
                Err(self.roll_back(store, migration, cause).await)
            }
        }
    }

    async fn apply_and_advance(&self, migration: &dyn Migration, tx: &mut dyn MigrationTx) -> AppResult<()> {
        let id = migration.id();
        match self.apply_timeout {
            None => migration.apply(&mut *tx).await?,
            Some(limit) => tokio::time::timeout(limit, migration.apply(&mut *tx))
                .await
                .map_err(|_| {
                    AppError::timeout(format!(
                        "Migration {id} did not finish within {}s",
                        limit.as_secs_f64()
                    ))
                })??,
        }
        tx.set_cursor(&id.timestamp).await
    }

    /// Undoes a failed migration. Always yields the error that ends the run.
    async fn roll_back(&self, store: &dyn MigrationStore, migration: &dyn Migration, cause: AppError) -> MigrationError {
        let id = migration.id().clone();

        let mut tx = match store.begin().await {
            Ok(tx) => tx,
            Err(rollback) => return rollback_failed(id, cause, rollback),
        };

        let outcome = match migration.rollback(&mut *tx).await {
            Some(outcome) => outcome,
            None => {
                abort_quietly(tx).await;
                return rollback_failed(id, cause, AppError::internal("no rollback is defined"));
            }
        };

        match finish(tx, outcome).await {
            Ok(()) => {
                transition(&id, MigrationState::RollingBack, MigrationState::RolledBack);
                MigrationError::Failed { id, cause }
            }
            Err(rollback) => rollback_failed(id, cause, rollback),
        }
    }
}

fn rollback_failed(id: MigrationId, cause: AppError, rollback: AppError) -> MigrationError {
    transition(&id, MigrationState::RollingBack, MigrationState::RollbackFailed);
    error!(
        migration = %id,
        error = %cause,
        rollback_error = %rollback,
        "Migration rollback failed, schema needs manual repair"
    );
    MigrationError::RollbackFailed { id, cause, rollback }
}

fn transition(id: &MigrationId, from: MigrationState, to: MigrationState) {
    debug!(migration = %id, from = %from, to = %to, "Migration state change");
}

/// Commits on success, aborts on failure.
async fn finish(tx: Box<dyn MigrationTx>, outcome: AppResult<()>) -> AppResult<()> {
    match outcome {
        Ok(()) => tx.commit().await,
        Err(e) => {
            abort_quietly(tx).await;
            Err(e)
        }
    }
}

async fn abort_quietly(tx: Box<dyn MigrationTx>) {
    if let Err(e) = tx.abort().await {
        warn!(error = %e, "Failed to abort migration transaction");
    }
}
