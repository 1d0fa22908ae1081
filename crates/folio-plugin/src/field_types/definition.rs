//! The field-type contract.

use std::fmt;
use std::marker::PhantomData;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use folio_core::{AppError, AppResult};

use super::context::FieldContext;

/// In-memory value of a field. Field types pick which JSON shapes they
/// accept and reject the rest in `serialize`.
pub type FieldValue = serde_json::Value;

/// Configurable settings attached to a field type.
///
/// The default, the settings editor, and the settings wire format come
/// together: a field type either exposes all of them through this trait or
/// has no settings at all.
pub trait SettingsContract: Send + Sync + fmt::Debug {
    /// Settings applied to inputs that were never configured.
    fn default_settings(&self) -> FieldValue;

    /// Encodes settings for storage on the collection input.
    fn serialize_settings(&self, settings: &FieldValue) -> AppResult<String>;

    /// Decodes stored settings.
    fn deserialize_settings(&self, raw: &str) -> AppResult<FieldValue>;
}

/// Settings backed by a typed struct.
///
/// `T::default()` is the default; the struct's serde shape is the wire
/// format, so anything the struct rejects is rejected on both paths.
pub struct JsonSettings<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonSettings<T> {
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonSettings<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for JsonSettings<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSettings")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> SettingsContract for JsonSettings<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    fn default_settings(&self) -> FieldValue {
        serde_json::to_value(T::default()).unwrap_or(FieldValue::Null)
    }

    fn serialize_settings(&self, settings: &FieldValue) -> AppResult<String> {
        let typed: T = serde_json::from_value(settings.clone())
            .map_err(|e| AppError::validation(format!("Invalid field settings: {e}")))?;
        Ok(serde_json::to_string(&typed)?)
    }

    fn deserialize_settings(&self, raw: &str) -> AppResult<FieldValue> {
        let typed: T = serde_json::from_str(raw)
            .map_err(|e| AppError::validation(format!("Invalid stored field settings: {e}")))?;
        Ok(serde_json::to_value(typed)?)
    }
}

/// A UI description handed to the admin frontend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedView {
    /// Frontend component that draws the view.
    pub component: String,
    /// Props passed to the component.
    pub props: serde_json::Value,
}

impl RenderedView {
    pub fn new(component: impl Into<String>, props: serde_json::Value) -> Self {
        Self {
            component: component.into(),
            props,
        }
    }
}

/// Inputs to [`FieldType::render_input`].
#[derive(Debug, Clone, Copy)]
pub struct InputProps<'a> {
    /// Form name of the input.
    pub input_name: &'a str,
    /// Current value, if the entry already has one.
    pub value: Option<&'a FieldValue>,
    /// Resolved settings, for field types that have them.
    pub settings: Option<&'a FieldValue>,
    /// Whether the input must be filled.
    pub required: bool,
}

/// Inputs to [`FieldType::render_settings`].
#[derive(Debug, Clone, Copy)]
pub struct SettingsProps<'a> {
    /// Settings currently stored on the input.
    pub settings: &'a FieldValue,
}

/// A pluggable kind of content value.
///
/// Implementations must keep `deserialize(serialize(v)) == v` for every
/// value `serialize` accepts.
#[async_trait]
pub trait FieldType: Send + Sync + fmt::Debug {
    /// Unique id, stored next to every value of this type.
    fn id(&self) -> &str;

    /// Human-readable name.
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Encodes a value for storage.
    fn serialize(&self, value: &FieldValue) -> AppResult<String>;

    /// Decodes a stored value.
    fn deserialize(&self, raw: &str) -> AppResult<FieldValue>;

    /// Settings contract, if this type is configurable.
    fn settings(&self) -> Option<&dyn SettingsContract> {
        None
    }

    /// Checks a serialized value against the input's settings.
    ///
    /// May consult the authenticated data port on `ctx`, e.g. to verify a
    /// referenced entry exists.
    async fn validate(
        &self,
        _raw: &str,
        _settings: Option<&FieldValue>,
        _ctx: &FieldContext,
    ) -> AppResult<()> {
        Ok(())
    }

    /// Whether this type may be offered in `ctx`.
    fn is_allowed(&self, _ctx: &FieldContext) -> bool {
        true
    }

    /// Describes the entry editor for this type.
    fn render_input(&self, props: &InputProps<'_>) -> RenderedView;

    /// Describes the settings editor. Types without settings return `None`.
    fn render_settings(&self, _props: &SettingsProps<'_>) -> Option<RenderedView> {
        None
    }

    /// Renders a stored value as HTML for the public site.
    async fn render_html(
        &self,
        raw: &str,
        _settings: Option<&FieldValue>,
        _ctx: &FieldContext,
    ) -> AppResult<String> {
        Ok(escape_html(raw))
    }
}

/// Escapes text for inclusion in HTML element content or attributes.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", deny_unknown_fields)]
    struct Limits {
        max_items: Option<u32>,
        #[serde(default)]
        sorted: bool,
    }

    #[test]
    fn test_json_settings_default_round_trip() {
        let contract = JsonSettings::<Limits>::new();
        let defaults = contract.default_settings();
        let raw = contract.serialize_settings(&defaults).unwrap();
        assert_eq!(contract.deserialize_settings(&raw).unwrap(), defaults);
    }

    #[test]
    fn test_json_settings_rejects_foreign_shape() {
        let contract = JsonSettings::<Limits>::new();
        let err = contract
            .serialize_settings(&serde_json::json!({ "colour": "red" }))
            .unwrap_err();
        assert_eq!(err.kind, folio_core::error::ErrorKind::Validation);
        assert!(contract.deserialize_settings("not json").is_err());
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }
}
