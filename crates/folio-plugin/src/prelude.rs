//! Prelude for plugin crates.

pub use async_trait::async_trait;

pub use crate::field_types::{
    AuthenticatedDataPort, FieldContext, FieldType, FieldValue, InputProps, JsonSettings,
    RenderedView, SettingsContract, SettingsProps,
};
pub use crate::hooks::{HookError, HookEvent, HookHandler, HookPayload, HookSet};
pub use crate::loader::{FactoryContext, OneOrMany, PluginCatalog};
pub use crate::logger::PluginLogger;
pub use crate::routes::{RouteRegistrar, registrar};
