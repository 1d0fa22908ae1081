//! # folio-plugin
//!
//! Extensibility core for Folio. Provides:
//!
//! - A field-type registry for pluggable content field types
//! - A lifecycle hook registry with veto (`before*`) and advisory
//!   (`after*`) dispatch semantics
//! - A plugin loader that wires field-type, hook, and route plugins from an
//!   operator manifest into those registries
//! - [`ExtensionHost`], which owns the frozen registries after boot

pub mod field_types;
pub mod hooks;
pub mod host;
pub mod loader;
pub mod logger;
pub mod prelude;
pub mod routes;

pub use field_types::{FieldType, FieldTypeError, FieldTypeRegistry, SettingsContract};
pub use hooks::{HookDispatcher, HookError, HookEvent, HookPayload, HookRegistry, HookSet};
pub use host::ExtensionHost;
pub use loader::{PluginCatalog, PluginKind, PluginSelection};
pub use logger::PluginLogger;
pub use routes::RouteRegistry;
