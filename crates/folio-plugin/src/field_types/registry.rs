//! Field-type registry.
//!
//! Filled once during boot by the loader, then shared read-only behind an
//! `Arc`. Lookups of ids that are no longer registered never fail hard:
//! content written by a removed plugin must still load.

use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::{info, warn};

use folio_core::{AppError, AppResult};

use super::context::FieldContext;
use super::definition::{FieldType, FieldValue, escape_html};
use crate::loader::is_valid_name;

/// Errors raised while registering or resolving field types.
#[derive(Debug, Error)]
pub enum FieldTypeError {
    #[error("Field type '{id}' is already registered")]
    DuplicateFieldType { id: String },

    #[error("Field type '{id}' is malformed: {reason}")]
    InvalidDefinition { id: String, reason: String },

    #[error("Field type '{id}' is not available")]
    Unavailable { id: String },
}

impl From<FieldTypeError> for AppError {
    fn from(err: FieldTypeError) -> Self {
        match &err {
            FieldTypeError::Unavailable { .. } => AppError::not_found(err.to_string()),
            FieldTypeError::DuplicateFieldType { .. } | FieldTypeError::InvalidDefinition { .. } => {
                AppError::configuration(err.to_string())
            }
        }
    }
}

/// Registered field types, in registration order.
#[derive(Debug, Default)]
pub struct FieldTypeRegistry {
    types: IndexMap<String, Arc<dyn FieldType>>,
}

impl FieldTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a field type under its id.
    pub fn register(&mut self, field_type: Arc<dyn FieldType>) -> Result<(), FieldTypeError> {
        check_definition(field_type.as_ref())?;

        let id = field_type.id().to_string();
        if self.types.contains_key(&id) {
            return Err(FieldTypeError::DuplicateFieldType { id });
        }

        info!(
            field_type = %id,
            name = %field_type.name(),
            has_settings = field_type.settings().is_some(),
            "Field type registered"
        );
        self.types.insert(id, field_type);
        Ok(())
    }

    /// Looks up a field type. A miss is logged, not raised.
    pub fn get(&self, id: &str) -> Option<Arc<dyn FieldType>> {
        let found = self.types.get(id).cloned();
        if found.is_none() {
            warn!(field_type = %id, "Field type is not registered");
        }
        found
    }

    /// Looks up a field type for an operation that cannot proceed without it.
    pub fn resolve(&self, id: &str) -> Result<Arc<dyn FieldType>, FieldTypeError> {
        self.get(id).ok_or_else(|| FieldTypeError::Unavailable { id: id.to_string() })
    }

    /// Snapshot of every registration, in registration order.
    pub fn all(&self) -> Vec<(String, Arc<dyn FieldType>)> {
        self.types
            .iter()
            .map(|(id, ft)| (id.clone(), ft.clone()))
            .collect()
    }

    /// Field types that may be offered in `ctx`.
    pub fn allowed(&self, ctx: &FieldContext) -> Vec<Arc<dyn FieldType>> {
        self.types
            .values()
            .filter(|ft| ft.is_allowed(ctx))
            .cloned()
            .collect()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.types.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.types.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Encodes `value` with the field type `id`.
    pub fn serialize(&self, id: &str, value: &FieldValue) -> AppResult<String> {
        Ok(self.resolve(id)?.serialize(value)?)
    }

    /// Decodes `raw` with the field type `id`.
    pub fn deserialize(&self, id: &str, raw: &str) -> AppResult<FieldValue> {
        Ok(self.resolve(id)?.deserialize(raw)?)
    }

    /// Settings for an input, falling back to the type's defaults when the
    /// input was never configured.
    pub fn resolve_settings(
        &self,
        id: &str,
        raw_settings: Option<&str>,
    ) -> AppResult<Option<FieldValue>> {
        let field_type = self.resolve(id)?;
        let Some(contract) = field_type.settings() else {
            return Ok(None);
        };
        match raw_settings {
            Some(raw) => contract.deserialize_settings(raw).map(Some),
            None => Ok(Some(contract.default_settings())),
        }
    }

    /// Validates a serialized value for an input of type `id`.
    pub async fn validate(
        &self,
        id: &str,
        raw: &str,
        raw_settings: Option<&str>,
        ctx: &FieldContext,
    ) -> AppResult<()> {
        let field_type = self.resolve(id)?;
        if !field_type.is_allowed(ctx) {
            return Err(AppError::authorization(format!(
                "Field type '{id}' may not be used here"
            )));
        }

        let settings = self.resolve_settings(id, raw_settings)?;
        field_type.deserialize(raw)?;
        field_type.validate(raw, settings.as_ref(), ctx).await
    }

    /// Renders a stored value as HTML.
    ///
    /// Values whose type is no longer registered render as inert escaped
    /// text tagged with the missing id.
    pub async fn render_html(
        &self,
        id: &str,
        raw: &str,
        raw_settings: Option<&str>,
        ctx: &FieldContext,
    ) -> AppResult<String> {
        if !self.contains(id) {
            warn!(field_type = %id, "Rendering value of unavailable field type as plain text");
            return Ok(format!(
                r#"<span class="field-unavailable" data-field-type="{}">{}</span>"#,
                escape_html(id),
                escape_html(raw)
            ));
        }

        let field_type = self.resolve(id)?;
        let settings = self.resolve_settings(id, raw_settings)?;
        field_type.render_html(raw, settings.as_ref(), ctx).await
    }
}

fn check_definition(field_type: &dyn FieldType) -> Result<(), FieldTypeError> {
    let id = field_type.id();
    let invalid = |reason: &str| FieldTypeError::InvalidDefinition {
        id: id.to_string(),
        reason: reason.to_string(),
    };

    if !is_valid_name(id) {
        return Err(invalid(
            "id must be non-empty and use only letters, digits, '_' and '-'",
        ));
    }
    if field_type.name().trim().is_empty() {
        return Err(invalid("name must not be empty"));
    }

    if let Some(contract) = field_type.settings() {
        let defaults = contract.default_settings();
        let raw = contract
            .serialize_settings(&defaults)
            .map_err(|e| invalid(&format!("default settings cannot be serialized: {}", e.message)))?;
        let decoded = contract
            .deserialize_settings(&raw)
            .map_err(|e| invalid(&format!("serialized default settings cannot be read back: {}", e.message)))?;
        if decoded != defaults {
            return Err(invalid("default settings change across a serialize round trip"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::field_types::builtin::{Checkbox, Select, Text};
    use crate::field_types::definition::{InputProps, RenderedView, SettingsContract};

    #[derive(Debug)]
    struct Nameless;

    impl FieldType for Nameless {
        fn id(&self) -> &str {
            "nameless"
        }
        fn name(&self) -> &str {
            "  "
        }
        fn serialize(&self, value: &FieldValue) -> AppResult<String> {
            Ok(value.to_string())
        }
        fn deserialize(&self, raw: &str) -> AppResult<FieldValue> {
            Ok(serde_json::from_str(raw)?)
        }
        fn render_input(&self, _props: &InputProps<'_>) -> RenderedView {
            RenderedView::new("Nameless", json!({}))
        }
    }

    #[derive(Debug)]
    struct LossySettings;

    impl SettingsContract for LossySettings {
        fn default_settings(&self) -> FieldValue {
            json!({ "limit": 3 })
        }
        fn serialize_settings(&self, _settings: &FieldValue) -> AppResult<String> {
            Ok("{}".to_string())
        }
        fn deserialize_settings(&self, raw: &str) -> AppResult<FieldValue> {
            Ok(serde_json::from_str(raw)?)
        }
    }

    #[derive(Debug)]
    struct Lossy;

    impl FieldType for Lossy {
        fn id(&self) -> &str {
            "lossy"
        }
        fn name(&self) -> &str {
            "Lossy"
        }
        fn serialize(&self, value: &FieldValue) -> AppResult<String> {
            Ok(value.to_string())
        }
        fn deserialize(&self, raw: &str) -> AppResult<FieldValue> {
            Ok(serde_json::from_str(raw)?)
        }
        fn settings(&self) -> Option<&dyn SettingsContract> {
            Some(&LossySettings)
        }
        fn render_input(&self, _props: &InputProps<'_>) -> RenderedView {
            RenderedView::new("Lossy", json!({}))
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = FieldTypeRegistry::new();
        registry.register(Arc::new(Checkbox)).unwrap();

        assert!(registry.contains("checkbox"));
        assert_eq!(registry.get("checkbox").unwrap().name(), "Checkbox");
        assert!(registry.get("rating").is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut registry = FieldTypeRegistry::new();
        registry.register(Arc::new(Checkbox)).unwrap();

        let err = registry.register(Arc::new(Checkbox)).unwrap_err();
        assert!(matches!(err, FieldTypeError::DuplicateFieldType { ref id } if id == "checkbox"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_malformed_definitions_rejected() {
        let mut registry = FieldTypeRegistry::new();
        assert!(matches!(
            registry.register(Arc::new(Nameless)),
            Err(FieldTypeError::InvalidDefinition { .. })
        ));
        assert!(matches!(
            registry.register(Arc::new(Lossy)),
            Err(FieldTypeError::InvalidDefinition { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_all_preserves_registration_order() {
        let mut registry = FieldTypeRegistry::new();
        registry.register(Arc::new(Text)).unwrap();
        registry.register(Arc::new(Checkbox)).unwrap();
        registry.register(Arc::new(Select)).unwrap();

        let ids: Vec<String> = registry.all().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, ["text", "checkbox", "select"]);
    }

    #[test]
    fn test_settings_fall_back_to_defaults() {
        let mut registry = FieldTypeRegistry::new();
        registry.register(Arc::new(Checkbox)).unwrap();
        registry.register(Arc::new(Select)).unwrap();

        assert_eq!(registry.resolve_settings("checkbox", None).unwrap(), None);
        assert_eq!(
            registry.resolve_settings("select", None).unwrap(),
            Some(json!({ "options": [] }))
        );
    }

    #[tokio::test]
    async fn test_validate_unknown_type_is_not_found() {
        let registry = FieldTypeRegistry::new();
        let err = registry
            .validate("rating", "5", None, &FieldContext::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, folio_core::error::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_removed_type_renders_inert() {
        let registry = FieldTypeRegistry::new();
        let html = registry
            .render_html("rating", "<b>5</b>", None, &FieldContext::new())
            .await
            .unwrap();
        assert_eq!(
            html,
            r#"<span class="field-unavailable" data-field-type="rating">&lt;b&gt;5&lt;/b&gt;</span>"#
        );
    }
}
