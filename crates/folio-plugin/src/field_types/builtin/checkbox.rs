use async_trait::async_trait;
use serde_json::json;

use folio_core::{AppError, AppResult};

use crate::field_types::context::FieldContext;
use crate::field_types::definition::{FieldType, FieldValue, InputProps, RenderedView};

/// A true/false toggle, stored as `"true"` or `"false"`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Checkbox;

#[async_trait]
impl FieldType for Checkbox {
    fn id(&self) -> &str {
        "checkbox"
    }

    fn name(&self) -> &str {
        "Checkbox"
    }

    fn description(&self) -> &str {
        "A yes/no toggle"
    }

    fn serialize(&self, value: &FieldValue) -> AppResult<String> {
        match value {
            FieldValue::Bool(checked) => Ok(checked.to_string()),
            other => Err(AppError::validation(format!(
                "Checkbox values must be booleans, got {other}"
            ))),
        }
    }

    fn deserialize(&self, raw: &str) -> AppResult<FieldValue> {
        match raw {
            "true" => Ok(FieldValue::Bool(true)),
            "false" => Ok(FieldValue::Bool(false)),
            other => Err(AppError::validation(format!(
                "Stored checkbox value '{other}' is not 'true' or 'false'"
            ))),
        }
    }

    fn render_input(&self, props: &InputProps<'_>) -> RenderedView {
        let checked = props.value.and_then(FieldValue::as_bool).unwrap_or(false);
        RenderedView::new(
            "CheckboxInput",
            json!({ "name": props.input_name, "checked": checked, "required": props.required }),
        )
    }

    async fn render_html(
        &self,
        raw: &str,
        _settings: Option<&FieldValue>,
        _ctx: &FieldContext,
    ) -> AppResult<String> {
        let checked = self.deserialize(raw)?.as_bool().unwrap_or(false);
        Ok(if checked {
            r#"<input type="checkbox" checked disabled>"#.to_string()
        } else {
            r#"<input type="checkbox" disabled>"#.to_string()
        })
    }
}
