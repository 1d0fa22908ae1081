//! Migrations that bring pre-cursor installations up to the current schema.

use std::sync::Arc;

use super::definition::{Migration, SqlMigration};
use super::error::MigrationError;

pub fn builtin_migrations() -> Result<Vec<Arc<dyn Migration>>, MigrationError> {
    let migrations = vec![
        SqlMigration::new(
            "2023011014300000-add-website-hook-url",
            "ALTER TABLE websites ADD COLUMN IF NOT EXISTS hook_url TEXT;",
        )?
        .with_rollback("ALTER TABLE websites DROP COLUMN IF EXISTS hook_url;"),
        SqlMigration::new(
            "2023021721394600-add-collection-title-input",
            "ALTER TABLE collections ADD COLUMN IF NOT EXISTS title_input_id UUID;",
        )?
        .with_rollback("ALTER TABLE collections DROP COLUMN IF EXISTS title_input_id;"),
        SqlMigration::new(
            "2023052209150000-add-input-settings",
            "ALTER TABLE collection_inputs ADD COLUMN IF NOT EXISTS settings TEXT;",
        )?
        .with_rollback("ALTER TABLE collection_inputs DROP COLUMN IF EXISTS settings;"),
        SqlMigration::new(
            "2023090411020000-add-input-position",
            "ALTER TABLE collection_inputs ADD COLUMN IF NOT EXISTS position INTEGER NOT NULL DEFAULT 0;",
        )?
        .with_rollback("ALTER TABLE collection_inputs DROP COLUMN IF EXISTS position;"),
        // Uploads that predate confirmation are complete.
        SqlMigration::new(
            "2024013116450000-add-media-confirmation",
            "ALTER TABLE media ADD COLUMN IF NOT EXISTS confirmed BOOLEAN NOT NULL DEFAULT TRUE;\n\
             ALTER TABLE media ALTER COLUMN confirmed SET DEFAULT FALSE;",
        )?
        .with_rollback("ALTER TABLE media DROP COLUMN IF EXISTS confirmed;"),
        SqlMigration::new(
            "2024061208300000-index-entry-values-by-input",
            "CREATE INDEX IF NOT EXISTS idx_entry_values_input ON collection_entry_values(input_id);",
        )?
        .with_rollback("DROP INDEX IF EXISTS idx_entry_values_input;"),
    ];

    Ok(migrations
        .into_iter()
        .map(|m| Arc::new(m) as Arc<dyn Migration>)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::MigrationRunner;

    #[test]
    fn test_builtin_set_is_valid() {
        let migrations = builtin_migrations().unwrap();
        assert!(!migrations.is_empty());
        let runner = MigrationRunner::new(migrations).unwrap();
        let ids: Vec<String> = runner.migrations().iter().map(|m| m.id().to_string()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }
}
