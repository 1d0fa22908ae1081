//! # folio-database
//!
//! PostgreSQL connection management and the timestamp-ordered schema
//! migration runner.

pub mod connection;
pub mod migration;

pub use connection::DatabasePool;
pub use migration::{MigrationRunner, run_migrations};
