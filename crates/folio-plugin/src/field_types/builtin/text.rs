use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use folio_core::{AppError, AppResult};

use crate::field_types::context::FieldContext;
use crate::field_types::definition::{
    FieldType, FieldValue, InputProps, JsonSettings, RenderedView, SettingsContract, SettingsProps,
};

/// Settings of a text input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TextSettings {
    /// Maximum length in characters.
    #[serde(default)]
    pub max_length: Option<u32>,
    /// Whether line breaks are allowed.
    #[serde(default)]
    pub multiline: bool,
}

static TEXT_SETTINGS: JsonSettings<TextSettings> = JsonSettings::new();

/// Free text, stored verbatim.
#[derive(Debug, Default, Clone, Copy)]
pub struct Text;

#[async_trait]
impl FieldType for Text {
    fn id(&self) -> &str {
        "text"
    }

    fn name(&self) -> &str {
        "Text"
    }

    fn description(&self) -> &str {
        "Single or multi-line text"
    }

    fn serialize(&self, value: &FieldValue) -> AppResult<String> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| AppError::validation(format!("Text values must be strings, got {value}")))
    }

    fn deserialize(&self, raw: &str) -> AppResult<FieldValue> {
        Ok(FieldValue::String(raw.to_string()))
    }

    fn settings(&self) -> Option<&dyn SettingsContract> {
        Some(&TEXT_SETTINGS)
    }

    async fn validate(
        &self,
        raw: &str,
        settings: Option<&FieldValue>,
        _ctx: &FieldContext,
    ) -> AppResult<()> {
        let settings: TextSettings = match settings {
            Some(value) => serde_json::from_value(value.clone())?,
            None => TextSettings::default(),
        };

        if let Some(max) = settings.max_length {
            let length = raw.chars().count();
            if length > max as usize {
                return Err(AppError::validation(format!(
                    "Text is {length} characters long; the limit is {max}"
                )));
            }
        }
        if !settings.multiline && raw.contains('\n') {
            return Err(AppError::validation("Line breaks are not allowed in this field"));
        }
        Ok(())
    }

    fn render_input(&self, props: &InputProps<'_>) -> RenderedView {
        let multiline = props
            .settings
            .and_then(|s| s.get("multiline"))
            .and_then(FieldValue::as_bool)
            .unwrap_or(false);
        RenderedView::new(
            if multiline { "TextArea" } else { "TextInput" },
            json!({
                "name": props.input_name,
                "value": props.value.and_then(FieldValue::as_str).unwrap_or_default(),
                "maxLength": props.settings.and_then(|s| s.get("maxLength")).cloned(),
                "required": props.required,
            }),
        )
    }

    fn render_settings(&self, props: &SettingsProps<'_>) -> Option<RenderedView> {
        Some(RenderedView::new(
            "TextSettings",
            json!({ "settings": props.settings }),
        ))
    }
}
