//! Plugin loader.
//!
//! Walks a manifest of `(name, factory)` entries for one plugin kind,
//! invokes each factory, and hands every contribution to a registration
//! callback. Entries with malformed names are skipped with a warning;
//! a factory that fails aborts the whole load.

pub mod catalog;

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use folio_core::error::ErrorKind;
use folio_core::{AppError, AppResult};

use crate::logger::PluginLogger;

pub use catalog::{PluginCatalog, PluginSelection};

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z_-]+$").expect("plugin name pattern compiles"));

/// Plugin names and field-type ids: ASCII letters, digits, `_` and `-`.
pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

/// Kind of contribution a plugin makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PluginKind {
    FieldTypes,
    Hooks,
    Routes,
}

impl PluginKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FieldTypes => "fieldTypes",
            Self::Hooks => "hooks",
            Self::Routes => "routes",
        }
    }
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single value or a list of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

impl<T> From<T> for OneOrMany<T> {
    fn from(item: T) -> Self {
        Self::One(item)
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(items: Vec<T>) -> Self {
        Self::Many(items)
    }
}

/// What a factory receives.
#[derive(Debug, Clone)]
pub struct FactoryContext {
    /// Logger scoped to `{kind}/{name}`.
    pub logger: PluginLogger,
}

/// Builds a plugin's contributions. Runs once, during boot.
pub type PluginFactory<C> = Box<dyn FnOnce(FactoryContext) -> AppResult<OneOrMany<C>> + Send>;

/// Boxes a closure as a [`PluginFactory`].
pub fn factory<C, F>(f: F) -> PluginFactory<C>
where
    F: FnOnce(FactoryContext) -> AppResult<OneOrMany<C>> + Send + 'static,
{
    Box::new(f)
}

/// One manifest entry.
pub struct PluginEntry<C> {
    pub name: String,
    pub plugin: OneOrMany<PluginFactory<C>>,
}

impl<C> PluginEntry<C> {
    pub fn new(name: impl Into<String>, factory: PluginFactory<C>) -> Self {
        Self {
            name: name.into(),
            plugin: OneOrMany::One(factory),
        }
    }

    pub fn with_factories(name: impl Into<String>, factories: Vec<PluginFactory<C>>) -> Self {
        Self {
            name: name.into(),
            plugin: OneOrMany::Many(factories),
        }
    }
}

impl<C> fmt::Debug for PluginEntry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let factories = match &self.plugin {
            OneOrMany::One(_) => 1,
            OneOrMany::Many(list) => list.len(),
        };
        f.debug_struct("PluginEntry")
            .field("name", &self.name)
            .field("factories", &factories)
            .finish()
    }
}

/// Ordered list of plugins of one kind.
#[derive(Debug)]
pub struct PluginManifest<C> {
    pub plugins: Vec<PluginEntry<C>>,
}

impl<C> PluginManifest<C> {
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    pub fn with(mut self, entry: PluginEntry<C>) -> Self {
        self.plugins.push(entry);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl<C> Default for PluginManifest<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// The plugin a contribution came from.
#[derive(Debug, Clone)]
pub struct LoadedPlugin {
    pub name: String,
    pub kind: PluginKind,
    pub logger: PluginLogger,
}

/// What a load pass did.
#[derive(Debug, Clone)]
pub struct LoadSummary {
    pub kind: PluginKind,
    /// Plugins whose factories all ran, in manifest order.
    pub loaded: Vec<String>,
    /// Entries skipped for a malformed name.
    pub skipped: Vec<String>,
    /// Contributions handed to the registration callback.
    pub contributions: usize,
}

/// Loads every plugin of one kind.
///
/// Entries are processed in manifest order and each entry's contributions
/// in the order its factories return them. A factory or registration
/// error aborts the load.
pub fn load<C, F>(manifest: PluginManifest<C>, kind: PluginKind, mut register: F) -> AppResult<LoadSummary>
where
    F: FnMut(&LoadedPlugin, C) -> AppResult<()>,
{
    let mut summary = LoadSummary {
        kind,
        loaded: Vec::new(),
        skipped: Vec::new(),
        contributions: 0,
    };

    for entry in manifest.plugins {
        if !is_valid_name(&entry.name) {
            warn!(
                kind = %kind,
                plugin = %entry.name,
                "Plugin name may only contain letters, digits, '_' and '-', skipping"
            );
            summary.skipped.push(entry.name);
            continue;
        }

        let plugin = LoadedPlugin {
            logger: PluginLogger::for_plugin(kind, &entry.name),
            name: entry.name,
            kind,
        };

        for build in entry.plugin.into_vec() {
            let contributions = build(FactoryContext {
                logger: plugin.logger.clone(),
            })
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Plugin,
                    format!("Plugin '{kind}/{}' failed to initialise: {}", plugin.name, e.message),
                    e,
                )
            })?;

            for contribution in contributions.into_vec() {
                register(&plugin, contribution)?;
                summary.contributions += 1;
            }
        }

        info!(kind = %kind, plugin = %plugin.name, "Plugin loaded");
        summary.loaded.push(plugin.name);
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(name: &str, values: OneOrMany<u32>) -> PluginEntry<u32> {
        PluginEntry::new(name, factory(move |_| Ok(values)))
    }

    #[test]
    fn test_name_rule() {
        for ok in ["checkbox", "rich-text", "field_2", "A"] {
            assert!(is_valid_name(ok), "{ok}");
        }
        for bad in ["", "rich text", "a/b", "café", "x.y"] {
            assert!(!is_valid_name(bad), "{bad}");
        }
    }

    #[test]
    fn test_one_or_many_flattened_in_order() {
        let manifest = PluginManifest::new()
            .with(numbers("single", OneOrMany::One(1)))
            .with(numbers("multi", OneOrMany::Many(vec![2, 3])))
            .with(PluginEntry::with_factories(
                "split",
                vec![
                    factory(|_| Ok(OneOrMany::One(4))),
                    factory(|_| Ok(OneOrMany::Many(vec![5, 6]))),
                ],
            ));

        let mut seen = Vec::new();
        let summary = load(manifest, PluginKind::Hooks, |plugin, n| {
            seen.push((plugin.name.clone(), n));
            Ok(())
        })
        .unwrap();

        let values: Vec<u32> = seen.iter().map(|(_, n)| *n).collect();
        assert_eq!(values, [1, 2, 3, 4, 5, 6]);
        assert_eq!(summary.loaded, ["single", "multi", "split"]);
        assert_eq!(summary.contributions, 6);
    }

    #[test]
    fn test_invalid_name_skipped() {
        let manifest = PluginManifest::new()
            .with(numbers("bad name", OneOrMany::One(1)))
            .with(numbers("good", OneOrMany::One(2)));

        let mut seen = Vec::new();
        let summary = load(manifest, PluginKind::FieldTypes, |_, n| {
            seen.push(n);
            Ok(())
        })
        .unwrap();

        assert_eq!(seen, [2]);
        assert_eq!(summary.skipped, ["bad name"]);
    }

    #[test]
    fn test_factory_failure_aborts() {
        let manifest = PluginManifest::new()
            .with(PluginEntry::new(
                "broken",
                factory(|_| Err(AppError::internal("missing API key"))),
            ))
            .with(numbers("later", OneOrMany::One(1)));

        let mut registered = 0;
        let err = load(manifest, PluginKind::Routes, |_, _: u32| {
            registered += 1;
            Ok(())
        })
        .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Plugin);
        assert!(err.message.contains("routes/broken"));
        assert!(err.message.contains("missing API key"));
        assert_eq!(registered, 0);
    }

    #[test]
    fn test_factory_gets_scoped_logger() {
        let manifest = PluginManifest::new().with(PluginEntry::new(
            "audit",
            factory(|ctx: FactoryContext| Ok(OneOrMany::One(ctx.logger.scope().to_string()))),
        ));

        let mut scope = String::new();
        load(manifest, PluginKind::Hooks, |_, s: String| {
            scope = s;
            Ok(())
        })
        .unwrap();
        assert_eq!(scope, "hooks/audit");
    }
}
