use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use folio_core::{AppError, AppResult};

use crate::field_types::context::FieldContext;
use crate::field_types::definition::{
    FieldType, FieldValue, InputProps, JsonSettings, RenderedView, SettingsContract, SettingsProps,
};

/// Settings of a number input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NumberSettings {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    /// Values must be `min + k * step`, with `min` defaulting to zero.
    #[serde(default)]
    pub step: Option<f64>,
}

static NUMBER_SETTINGS: JsonSettings<NumberSettings> = JsonSettings::new();

const STEP_TOLERANCE: f64 = 1e-9;

/// A JSON number, stored in its JSON text form.
#[derive(Debug, Default, Clone, Copy)]
pub struct Number;

#[async_trait]
impl FieldType for Number {
    fn id(&self) -> &str {
        "number"
    }

    fn name(&self) -> &str {
        "Number"
    }

    fn description(&self) -> &str {
        "An integer or decimal number"
    }

    fn serialize(&self, value: &FieldValue) -> AppResult<String> {
        match value {
            FieldValue::Number(n) => Ok(n.to_string()),
            other => Err(AppError::validation(format!(
                "Number values must be numbers, got {other}"
            ))),
        }
    }

    fn deserialize(&self, raw: &str) -> AppResult<FieldValue> {
        parse_number(raw)
            .map(FieldValue::Number)
            .ok_or_else(|| AppError::validation(format!("Stored value '{raw}' is not a number")))
    }

    fn settings(&self) -> Option<&dyn SettingsContract> {
        Some(&NUMBER_SETTINGS)
    }

    async fn validate(
        &self,
        raw: &str,
        settings: Option<&FieldValue>,
        _ctx: &FieldContext,
    ) -> AppResult<()> {
        let value = self
            .deserialize(raw)?
            .as_f64()
            .ok_or_else(|| AppError::validation(format!("'{raw}' is out of range")))?;
        let settings: NumberSettings = match settings {
            Some(s) => serde_json::from_value(s.clone())?,
            None => NumberSettings::default(),
        };

        if let Some(min) = settings.min.filter(|min| value < *min) {
            return Err(AppError::validation(format!("{value} is below the minimum of {min}")));
        }
        if let Some(max) = settings.max.filter(|max| value > *max) {
            return Err(AppError::validation(format!("{value} is above the maximum of {max}")));
        }
        if let Some(step) = settings.step.filter(|step| *step > 0.0) {
            let steps = (value - settings.min.unwrap_or(0.0)) / step;
            if (steps - steps.round()).abs() > STEP_TOLERANCE {
                return Err(AppError::validation(format!("{value} is not a multiple of {step}")));
            }
        }
        Ok(())
    }

    fn render_input(&self, props: &InputProps<'_>) -> RenderedView {
        let setting = |key: &str| props.settings.and_then(|s| s.get(key)).cloned();
        RenderedView::new(
            "NumberInput",
            json!({
                "name": props.input_name,
                "value": props.value.cloned(),
                "min": setting("min"),
                "max": setting("max"),
                "step": setting("step"),
                "required": props.required,
            }),
        )
    }

    fn render_settings(&self, props: &SettingsProps<'_>) -> Option<RenderedView> {
        Some(RenderedView::new(
            "NumberSettings",
            json!({ "settings": props.settings }),
        ))
    }
}

/// Integers stay integers; everything else goes through the exact float
/// parser so `to_string` output always reads back bit for bit.
fn parse_number(raw: &str) -> Option<serde_json::Number> {
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n.into());
    }
    if let Ok(n) = raw.parse::<u64>() {
        return Some(n.into());
    }
    raw.parse::<f64>().ok().and_then(serde_json::Number::from_f64)
}
