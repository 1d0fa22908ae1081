//! Compiled-in plugins and the operator's selection of them.
//!
//! Plugins are linked into the binary and registered in a
//! [`PluginCatalog`] under their manifest name. The operator's manifest
//! file ([`PluginSelection`]) lists which of them to load, per kind and in
//! order.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use folio_core::{AppError, AppResult};

use super::{FactoryContext, OneOrMany, PluginEntry, PluginKind, PluginManifest};
use crate::field_types::FieldType;
use crate::field_types::builtin::builtin_field_types;
use crate::hooks::HookSet;
use crate::routes::RouteRegistrar;

type SharedFactory<C> = Arc<dyn Fn(FactoryContext) -> AppResult<OneOrMany<C>> + Send + Sync>;

/// Every plugin compiled into this build, by kind and name.
#[derive(Default)]
pub struct PluginCatalog {
    field_types: IndexMap<String, SharedFactory<Arc<dyn FieldType>>>,
    hooks: IndexMap<String, SharedFactory<HookSet>>,
    routes: IndexMap<String, SharedFactory<RouteRegistrar>>,
}

impl PluginCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog holding the built-in field types.
    pub fn with_builtin_field_types() -> Self {
        builtin_field_types()
            .into_iter()
            .fold(Self::new(), |catalog, (name, field_type)| {
                catalog.field_type(name, move |_| Ok(OneOrMany::One(field_type.clone())))
            })
    }

    /// Adds a field-type plugin.
    pub fn field_type<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(FactoryContext) -> AppResult<OneOrMany<Arc<dyn FieldType>>> + Send + Sync + 'static,
    {
        self.field_types.insert(name.into(), Arc::new(factory));
        self
    }

    /// Adds a hooks plugin.
    pub fn hooks<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(FactoryContext) -> AppResult<OneOrMany<HookSet>> + Send + Sync + 'static,
    {
        self.hooks.insert(name.into(), Arc::new(factory));
        self
    }

    /// Adds a routes plugin.
    pub fn routes<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(FactoryContext) -> AppResult<OneOrMany<RouteRegistrar>> + Send + Sync + 'static,
    {
        self.routes.insert(name.into(), Arc::new(factory));
        self
    }

    /// Names available for a kind, in catalog order.
    pub fn names(&self, kind: PluginKind) -> Vec<&str> {
        let keys: Vec<&String> = match kind {
            PluginKind::FieldTypes => self.field_types.keys().collect(),
            PluginKind::Hooks => self.hooks.keys().collect(),
            PluginKind::Routes => self.routes.keys().collect(),
        };
        keys.into_iter().map(String::as_str).collect()
    }

    pub fn field_type_manifest(&self, names: &[String]) -> AppResult<PluginManifest<Arc<dyn FieldType>>> {
        manifest_for(PluginKind::FieldTypes, &self.field_types, names)
    }

    pub fn hook_manifest(&self, names: &[String]) -> AppResult<PluginManifest<HookSet>> {
        manifest_for(PluginKind::Hooks, &self.hooks, names)
    }

    pub fn route_manifest(&self, names: &[String]) -> AppResult<PluginManifest<RouteRegistrar>> {
        manifest_for(PluginKind::Routes, &self.routes, names)
    }
}

impl fmt::Debug for PluginCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginCatalog")
            .field("field_types", &self.names(PluginKind::FieldTypes))
            .field("hooks", &self.names(PluginKind::Hooks))
            .field("routes", &self.names(PluginKind::Routes))
            .finish()
    }
}

fn manifest_for<C: 'static>(
    kind: PluginKind,
    available: &IndexMap<String, SharedFactory<C>>,
    names: &[String],
) -> AppResult<PluginManifest<C>> {
    let mut manifest = PluginManifest::new();
    for name in names {
        let factory = available.get(name).cloned().ok_or_else(|| {
            AppError::configuration(format!(
                "Plugin '{kind}/{name}' is listed in the manifest but not part of this build"
            ))
        })?;
        manifest = manifest.with(PluginEntry::new(
            name.clone(),
            Box::new(move |ctx| factory(ctx)),
        ));
    }
    Ok(manifest)
}

/// The operator's manifest file.
///
/// ```toml
/// field_types = ["checkbox", "text"]
/// hooks = ["audit"]
/// routes = ["audit"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginSelection {
    /// Defaults to every built-in field type.
    #[serde(default = "default_field_types")]
    pub field_types: Vec<String>,
    #[serde(default)]
    pub hooks: Vec<String>,
    #[serde(default)]
    pub routes: Vec<String>,
}

impl Default for PluginSelection {
    fn default() -> Self {
        Self {
            field_types: default_field_types(),
            hooks: Vec::new(),
            routes: Vec::new(),
        }
    }
}

impl PluginSelection {
    /// Reads the manifest at `path`. A missing file selects the defaults.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "No plugin manifest found, loading built-in field types only");
            return Ok(Self::default());
        }

        let selection: Self = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?
            .try_deserialize()?;

        info!(
            path = %path.display(),
            field_types = selection.field_types.len(),
            hooks = selection.hooks.len(),
            routes = selection.routes.len(),
            "Plugin manifest loaded"
        );
        Ok(selection)
    }

    /// Selected names for a kind, in load order.
    pub fn names(&self, kind: PluginKind) -> &[String] {
        match kind {
            PluginKind::FieldTypes => &self.field_types,
            PluginKind::Hooks => &self.hooks,
            PluginKind::Routes => &self.routes,
        }
    }
}

fn default_field_types() -> Vec<String> {
    builtin_field_types()
        .into_iter()
        .map(|(name, _)| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use folio_core::error::ErrorKind;

    #[test]
    fn test_unknown_name_is_configuration_error() {
        let catalog = PluginCatalog::with_builtin_field_types();
        let err = catalog
            .field_type_manifest(&["checkbox".to_string(), "rating".to_string()])
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(err.message.contains("fieldTypes/rating"));
    }

    #[test]
    fn test_manifest_follows_selection_order() {
        let catalog = PluginCatalog::with_builtin_field_types();
        let manifest = catalog
            .field_type_manifest(&["select".to_string(), "checkbox".to_string()])
            .unwrap();
        let names: Vec<&str> = manifest.plugins.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["select", "checkbox"]);
    }

    #[test]
    fn test_missing_manifest_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let selection = PluginSelection::load(dir.path().join("plugins.toml")).unwrap();
        assert_eq!(selection, PluginSelection::default());
        assert_eq!(selection.field_types, ["checkbox", "text", "number", "select"]);
        assert!(selection.hooks.is_empty());
    }

    #[test]
    fn test_manifest_file_parsed() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, r#"field_types = ["text"]"#).unwrap();
        writeln!(file, r#"hooks = ["audit"]"#).unwrap();

        let selection = PluginSelection::load(file.path()).unwrap();
        assert_eq!(selection.field_types, ["text"]);
        assert_eq!(selection.hooks, ["audit"]);
        assert!(selection.routes.is_empty());
    }
}
