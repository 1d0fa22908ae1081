//! CLI command definitions and dispatch.

pub mod config;
pub mod migrate;
pub mod plugins;

use clap::{Parser, Subcommand};

use crate::output::{OutputFormat, Printer};
use folio_core::config::AppConfig;
use folio_core::error::AppError;
use folio_database::DatabasePool;

/// Folio content backend administration
#[derive(Debug, Parser)]
#[command(name = "folio", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay (`config/{env}.toml`)
    #[arg(short, long, default_value = "development", env = "FOLIO_ENV")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Plugin catalog and manifest inspection
    Plugins(plugins::PluginsArgs),
    /// Configuration inspection
    Config(config::ConfigArgs),
}

impl Cli {
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load(&self.config, &self.env)?;
        let out = Printer::new(self.format);
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &config, out).await,
            Commands::Plugins(args) => plugins::execute(args, &config, out).await,
            Commands::Config(args) => config::execute(args, &config, &self.config, out),
        }
    }
}

/// Helper: create database pool from config
pub async fn create_db_pool(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}
