//! Configuration inspection commands.

use clap::{Args, Subcommand};

use crate::output::Printer;
use folio_core::config::AppConfig;
use folio_core::error::AppError;
use folio_database::connection::mask_password;

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the merged configuration
    Show,
    /// Check that the configuration loads and summarise it
    Validate,
}

pub fn execute(
    args: &ConfigArgs,
    config: &AppConfig,
    config_path: &str,
    out: Printer,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let mut shown = config.clone();
            shown.database.url = mask_password(&shown.database.url);
            out.item(&shown);
        }
        ConfigCommand::Validate => {
            out.success(&format!("Configuration '{config_path}' is valid"));
            out.field(
                "server",
                &format!("{}:{}", config.server.host, config.server.port),
            );
            out.field("database", &mask_password(&config.database.url));
            out.field("plugin manifest", &config.plugins.manifest);
            out.field(
                "hook timeout",
                &config
                    .hooks
                    .timeout_seconds
                    .map_or_else(|| "none".to_string(), |s| format!("{s}s")),
            );
        }
    }
    Ok(())
}
