//! Plugin catalog and manifest inspection commands.

use std::collections::HashSet;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::Printer;
use folio_core::config::AppConfig;
use folio_core::error::AppError;
use folio_plugin::{ExtensionHost, PluginCatalog, PluginKind, PluginSelection};

/// Arguments for the plugins command
#[derive(Debug, Args)]
pub struct PluginsArgs {
    #[command(subcommand)]
    pub command: PluginsCommand,
}

#[derive(Debug, Subcommand)]
pub enum PluginsCommand {
    /// List plugins compiled into this build and whether the manifest selects them
    List,
    /// Boot the selected plugins and list the registered field types
    FieldTypes,
    /// Boot the selected plugins and report what each stage loaded
    Check,
}

#[derive(Debug, Serialize, Tabled)]
struct PluginRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Selected")]
    selected: bool,
}

#[derive(Debug, Serialize, Tabled)]
struct FieldTypeRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
}

/// The catalog shipped with the server binary.
pub fn catalog() -> PluginCatalog {
    plugin_audit::register(PluginCatalog::with_builtin_field_types())
}

pub async fn execute(
    args: &PluginsArgs,
    config: &AppConfig,
    out: Printer,
) -> Result<(), AppError> {
    let catalog = catalog();
    let selection = PluginSelection::load(&config.plugins.manifest)?;

    match &args.command {
        PluginsCommand::List => {
            let mut rows = Vec::new();
            for kind in [PluginKind::FieldTypes, PluginKind::Hooks, PluginKind::Routes] {
                let selected: HashSet<&str> =
                    selection.names(kind).iter().map(String::as_str).collect();
                rows.extend(catalog.names(kind).into_iter().map(|name| PluginRow {
                    kind: kind.to_string(),
                    name: name.to_string(),
                    selected: selected.contains(name),
                }));
            }
            out.list(&rows);
        }
        PluginsCommand::FieldTypes => {
            let host = ExtensionHost::boot(&catalog, &selection, config.hooks.timeout())?;
            let rows: Vec<FieldTypeRow> = host
                .field_types()
                .all()
                .into_iter()
                .map(|(id, ft)| FieldTypeRow {
                    id,
                    name: ft.name().to_string(),
                    description: ft.description().to_string(),
                })
                .collect();
            out.list(&rows);
        }
        PluginsCommand::Check => {
            let host = ExtensionHost::boot(&catalog, &selection, config.hooks.timeout())?;
            for summary in host.summaries() {
                out.field(summary.kind.as_str(), &summary.loaded.join(", "));
                for name in &summary.skipped {
                    out.warning(&format!("skipped {}/{name}: invalid plugin name", summary.kind));
                }
            }
            out.success(&format!(
                "Manifest '{}' boots cleanly.",
                config.plugins.manifest
            ));
        }
    }

    Ok(())
}
