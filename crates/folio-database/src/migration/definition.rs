//! Migration definitions.

use std::fmt;

use async_trait::async_trait;

use folio_core::AppResult;

use super::error::MigrationError;
use super::store::MigrationTx;
use super::timestamp::MigrationId;

/// A single schema change.
#[async_trait]
pub trait Migration: Send + Sync + fmt::Debug {
    fn id(&self) -> &MigrationId;

    /// Applies the change. Runs inside a transaction that also advances the
    /// cursor.
    async fn apply(&self, tx: &mut dyn MigrationTx) -> AppResult<()>;

    /// Undoes a failed `apply`. `None` means no rollback is defined, which
    /// leaves a failed migration needing manual repair.
    async fn rollback(&self, _tx: &mut dyn MigrationTx) -> Option<AppResult<()>> {
        None
    }
}

/// A migration written as plain SQL.
#[derive(Debug, Clone)]
pub struct SqlMigration {
    id: MigrationId,
    up: String,
    down: Option<String>,
}

impl SqlMigration {
    pub fn new(id: &str, up: impl Into<String>) -> Result<Self, MigrationError> {
        Ok(Self {
            id: id.parse()?,
            up: up.into(),
            down: None,
        })
    }

    pub fn with_rollback(mut self, down: impl Into<String>) -> Self {
        self.down = Some(down.into());
        self
    }
}

#[async_trait]
impl Migration for SqlMigration {
    fn id(&self) -> &MigrationId {
        &self.id
    }

    async fn apply(&self, tx: &mut dyn MigrationTx) -> AppResult<()> {
        tx.execute(&self.up).await
    }

    async fn rollback(&self, tx: &mut dyn MigrationTx) -> Option<AppResult<()>> {
        match &self.down {
            Some(down) => Some(tx.execute(down).await),
            None => None,
        }
    }
}
