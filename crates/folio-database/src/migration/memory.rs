//! In-memory migration store.
//!
//! Records every committed statement and honours transaction boundaries,
//! which is all the runner observes. Used by tests and dry runs.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use folio_core::{AppError, AppResult};

use super::store::{InstallationState, MigrationStore, MigrationTx};
use super::timestamp::MigrationTimestamp;

#[derive(Debug, Default)]
struct MemoryState {
    cursor: Option<MigrationTimestamp>,
    has_tables: bool,
    committed: Vec<String>,
    failing: HashSet<String>,
}

/// A migration store held in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryMigrationStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryMigrationStore {
    /// Statement recorded when the base schema is created.
    pub const BASE_SCHEMA: &'static str = "-- base schema";

    /// An empty database.
    pub fn fresh() -> Self {
        Self::default()
    }

    /// Tables exist but no cursor was ever written.
    pub fn legacy() -> Self {
        let store = Self::default();
        store.lock().has_tables = true;
        store
    }

    /// A managed installation at `cursor`.
    pub fn at(cursor: MigrationTimestamp) -> Self {
        let store = Self::legacy();
        store.lock().cursor = Some(cursor);
        store
    }

    /// Makes `sql` fail whenever it is executed.
    pub fn fail_on(self, sql: impl Into<String>) -> Self {
        self.lock().failing.insert(sql.into());
        self
    }

    pub fn cursor(&self) -> Option<MigrationTimestamp> {
        self.lock().cursor
    }

    /// Statements from committed transactions, in commit order.
    pub fn committed(&self) -> Vec<String> {
        self.lock().committed.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl MigrationStore for MemoryMigrationStore {
    async fn read_cursor(&self) -> AppResult<Option<MigrationTimestamp>> {
        Ok(self.cursor())
    }

    async fn installation_state(&self) -> AppResult<InstallationState> {
        let state = self.lock();
        Ok(match state.cursor {
            Some(cursor) => InstallationState::Managed(cursor),
            None if state.has_tables => InstallationState::Legacy,
            None => InstallationState::Fresh,
        })
    }

    async fn create_base_schema(&self, tx: &mut dyn MigrationTx) -> AppResult<()> {
        tx.execute(Self::BASE_SCHEMA).await
    }

    async fn begin(&self) -> AppResult<Box<dyn MigrationTx>> {
        Ok(Box::new(MemoryTx {
            store: self.clone(),
            staged: Vec::new(),
            cursor: None,
        }))
    }
}

struct MemoryTx {
    store: MemoryMigrationStore,
    staged: Vec<String>,
    cursor: Option<MigrationTimestamp>,
}

#[async_trait]
impl MigrationTx for MemoryTx {
    async fn execute(&mut self, sql: &str) -> AppResult<()> {
        if self.store.lock().failing.contains(sql) {
            return Err(AppError::database(format!("statement failed: {sql}")));
        }
        self.staged.push(sql.to_string());
        Ok(())
    }

    async fn set_cursor(&mut self, cursor: &MigrationTimestamp) -> AppResult<()> {
        self.cursor = Some(*cursor);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryTx {
            store,
            staged,
            cursor,
        } = *self;
        let mut state = store.lock();
        if staged.iter().any(|s| s == MemoryMigrationStore::BASE_SCHEMA) {
            state.has_tables = true;
        }
        state.committed.extend(staged);
        if cursor.is_some() {
            state.cursor = cursor;
        }
        Ok(())
    }

    async fn abort(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}
