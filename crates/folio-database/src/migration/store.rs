//! Storage seam of the migration runner.

use async_trait::async_trait;

use folio_core::AppResult;

use super::timestamp::MigrationTimestamp;

/// What the runner finds on startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallationState {
    /// Empty database.
    Fresh,
    /// Content tables exist but no cursor was ever written.
    Legacy,
    /// A cursor exists.
    Managed(MigrationTimestamp),
}

/// One open transaction. Dropping it without `commit` discards its work.
#[async_trait]
pub trait MigrationTx: Send {
    /// Runs one or more SQL statements.
    async fn execute(&mut self, sql: &str) -> AppResult<()>;

    /// Moves the cursor, visible once the transaction commits.
    async fn set_cursor(&mut self, cursor: &MigrationTimestamp) -> AppResult<()>;

    async fn commit(self: Box<Self>) -> AppResult<()>;

    async fn abort(self: Box<Self>) -> AppResult<()>;
}

/// Where the schema and its migration cursor live.
#[async_trait]
pub trait MigrationStore: Send + Sync {
    async fn read_cursor(&self) -> AppResult<Option<MigrationTimestamp>>;

    async fn installation_state(&self) -> AppResult<InstallationState>;

    /// Creates the current schema from scratch inside `tx`.
    async fn create_base_schema(&self, tx: &mut dyn MigrationTx) -> AppResult<()>;

    async fn begin(&self) -> AppResult<Box<dyn MigrationTx>>;
}
