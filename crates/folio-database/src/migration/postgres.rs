//! PostgreSQL migration store.
//!
//! The cursor is a row in the `settings` table. Installations that predate
//! the cursor may not have that table yet, so it is created on first write.

use async_trait::async_trait;
use sqlx::{Executor, PgConnection, PgPool, Postgres, Transaction};
use tracing::debug;

use folio_core::error::{AppError, ErrorKind};
use folio_core::AppResult;

use super::schema::{BASE_SCHEMA, SETTINGS_TABLE};
use super::store::{InstallationState, MigrationStore, MigrationTx};
use super::timestamp::MigrationTimestamp;

/// Settings key holding the migration cursor.
pub const CURSOR_KEY: &str = "last-migration";

fn db_error(context: &str, err: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Database, format!("{context}: {err}"), err)
}

#[derive(Debug, Clone)]
pub struct PgMigrationStore {
    pool: PgPool,
}

impl PgMigrationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn table_exists(&self, table: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT to_regclass($1) IS NOT NULL")
            .bind(format!("public.{table}"))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to inspect schema", e))
    }
}

#[async_trait]
impl MigrationStore for PgMigrationStore {
    async fn read_cursor(&self) -> AppResult<Option<MigrationTimestamp>> {
        if !self.table_exists("settings").await? {
            return Ok(None);
        }

        let raw = sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = $1")
            .bind(CURSOR_KEY)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to read migration cursor", e))?;

        raw.map(|value| {
            value.parse().map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Stored migration cursor '{value}' is corrupt"),
                    e,
                )
            })
        })
        .transpose()
    }

    async fn installation_state(&self) -> AppResult<InstallationState> {
        if let Some(cursor) = self.read_cursor().await? {
            return Ok(InstallationState::Managed(cursor));
        }
        if self.table_exists("websites").await? {
            Ok(InstallationState::Legacy)
        } else {
            Ok(InstallationState::Fresh)
        }
    }

    async fn create_base_schema(&self, tx: &mut dyn MigrationTx) -> AppResult<()> {
        tx.execute(BASE_SCHEMA).await
    }

    async fn begin(&self) -> AppResult<Box<dyn MigrationTx>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin migration transaction", e))?;
        Ok(Box::new(PgMigrationTx { tx }))
    }
}

struct PgMigrationTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl MigrationTx for PgMigrationTx {
    async fn execute(&mut self, sql: &str) -> AppResult<()> {
        debug!(bytes = sql.len(), "Executing migration SQL");
        let conn: &mut PgConnection = &mut self.tx;
        conn.execute(sqlx::raw_sql(sql))
            .await
            .map(|_| ())
            .map_err(|e| db_error("Migration statement failed", e))
    }

    async fn set_cursor(&mut self, cursor: &MigrationTimestamp) -> AppResult<()> {
        let conn: &mut PgConnection = &mut self.tx;
        (&mut *conn)
            .execute(sqlx::raw_sql(SETTINGS_TABLE))
            .await
            .map_err(|e| db_error("Failed to create settings table", e))?;

        sqlx::query(
            "INSERT INTO settings (key, value) VALUES ($1, $2) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value",
        )
        .bind(CURSOR_KEY)
        .bind(cursor.to_string())
        .execute(conn)
        .await
        .map(|_| ())
        .map_err(|e| db_error("Failed to write migration cursor", e))
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| db_error("Failed to commit migration transaction", e))
    }

    async fn abort(self: Box<Self>) -> AppResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| db_error("Failed to abort migration transaction", e))
    }
}
