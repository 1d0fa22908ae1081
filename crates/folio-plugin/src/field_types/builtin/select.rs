use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use folio_core::{AppError, AppResult};

use crate::field_types::context::FieldContext;
use crate::field_types::definition::{
    FieldType, FieldValue, InputProps, JsonSettings, RenderedView, SettingsContract, SettingsProps,
};

/// Settings of a select input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SelectSettings {
    /// Allowed values. An empty list accepts anything until the input is
    /// configured.
    #[serde(default)]
    pub options: Vec<String>,
}

static SELECT_SETTINGS: JsonSettings<SelectSettings> = JsonSettings::new();

/// One value out of a configured list.
#[derive(Debug, Default, Clone, Copy)]
pub struct Select;

#[async_trait]
impl FieldType for Select {
    fn id(&self) -> &str {
        "select"
    }

    fn name(&self) -> &str {
        "Select"
    }

    fn description(&self) -> &str {
        "A choice from a fixed list of options"
    }

    fn serialize(&self, value: &FieldValue) -> AppResult<String> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| AppError::validation(format!("Select values must be strings, got {value}")))
    }

    fn deserialize(&self, raw: &str) -> AppResult<FieldValue> {
        Ok(FieldValue::String(raw.to_string()))
    }

    fn settings(&self) -> Option<&dyn SettingsContract> {
        Some(&SELECT_SETTINGS)
    }

    async fn validate(
        &self,
        raw: &str,
        settings: Option<&FieldValue>,
        _ctx: &FieldContext,
    ) -> AppResult<()> {
        let settings: SelectSettings = match settings {
            Some(s) => serde_json::from_value(s.clone())?,
            None => SelectSettings::default(),
        };
        if !settings.options.is_empty() && !settings.options.iter().any(|o| o == raw) {
            return Err(AppError::validation(format!(
                "'{raw}' is not one of: {}",
                settings.options.join(", ")
            )));
        }
        Ok(())
    }

    fn render_input(&self, props: &InputProps<'_>) -> RenderedView {
        RenderedView::new(
            "SelectInput",
            json!({
                "name": props.input_name,
                "value": props.value.and_then(FieldValue::as_str),
                "options": props.settings.and_then(|s| s.get("options")).cloned().unwrap_or_else(|| json!([])),
                "required": props.required,
            }),
        )
    }

    fn render_settings(&self, props: &SettingsProps<'_>) -> Option<RenderedView> {
        Some(RenderedView::new(
            "SelectSettings",
            json!({ "settings": props.settings }),
        ))
    }
}
