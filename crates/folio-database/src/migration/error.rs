//! Migration error types.

use thiserror::Error;

use folio_core::error::{AppError, ErrorKind};

use super::timestamp::MigrationId;

#[derive(Debug, Error)]
pub enum MigrationError {
    /// The migration set itself is malformed.
    #[error("Invalid migration: {0}")]
    Invalid(String),

    /// Reading or writing the cursor or schema failed outside any migration.
    #[error("Migration store error: {0}")]
    Store(#[source] AppError),

    /// The migration failed and its rollback succeeded. Schema and cursor
    /// are as they were before it.
    #[error("Migration {id} failed and was rolled back: {cause}")]
    Failed {
        id: MigrationId,
        #[source]
        cause: AppError,
    },

    /// The migration failed and so did its rollback. The schema may be
    /// inconsistent and needs manual repair.
    #[error("Migration {id} failed ({cause}) and its rollback failed too ({rollback}); manual repair required")]
    RollbackFailed {
        id: MigrationId,
        #[source]
        cause: AppError,
        rollback: AppError,
    },
}

impl MigrationError {
    /// Id of the migration that failed, if a specific one did.
    pub fn migration_id(&self) -> Option<&MigrationId> {
        match self {
            Self::Failed { id, .. } | Self::RollbackFailed { id, .. } => Some(id),
            Self::Invalid(_) | Self::Store(_) => None,
        }
    }
}

impl From<MigrationError> for AppError {
    fn from(err: MigrationError) -> Self {
        let kind = match &err {
            MigrationError::Invalid(_) => ErrorKind::Configuration,
            _ => ErrorKind::Database,
        };
        AppError::with_source(kind, err.to_string(), err)
    }
}
