//! Current schema, used to initialise fresh installations.
//!
//! Keep this in step with the built-in migrations: a fresh install gets
//! this schema and skips every migration authored before it.

/// Key-value settings, home of the migration cursor.
pub(crate) const SETTINGS_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);";

pub const BASE_SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS websites (
    id UUID PRIMARY KEY,
    title TEXT NOT NULL,
    hook_url TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS collections (
    id UUID PRIMARY KEY,
    website_id UUID NOT NULL REFERENCES websites(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    title_input_id UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS collection_inputs (
    id UUID PRIMARY KEY,
    collection_id UUID NOT NULL REFERENCES collections(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    field_type TEXT NOT NULL,
    settings TEXT,
    is_required BOOLEAN NOT NULL DEFAULT FALSE,
    position INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS collection_entries (
    id UUID PRIMARY KEY,
    collection_id UUID NOT NULL REFERENCES collections(id) ON DELETE CASCADE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS collection_entry_values (
    entry_id UUID NOT NULL REFERENCES collection_entries(id) ON DELETE CASCADE,
    input_id UUID NOT NULL REFERENCES collection_inputs(id) ON DELETE CASCADE,
    value TEXT,
    PRIMARY KEY (entry_id, input_id)
);

CREATE INDEX IF NOT EXISTS idx_entry_values_input ON collection_entry_values(input_id);

CREATE TABLE IF NOT EXISTS media (
    id UUID PRIMARY KEY,
    website_id UUID NOT NULL REFERENCES websites(id) ON DELETE CASCADE,
    file_name TEXT NOT NULL,
    mime_type TEXT NOT NULL,
    size_bytes BIGINT NOT NULL,
    confirmed BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";
