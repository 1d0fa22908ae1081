//! Round-trip check for field-type wire formats.
//!
//! Plugin authors call [`check_round_trip`] from their own tests to prove
//! a value survives storage unchanged.

use folio_core::{AppError, AppResult};

use super::definition::{FieldType, FieldValue};

/// Serializes `value`, reads it back, and compares.
pub fn check_round_trip(field_type: &dyn FieldType, value: &FieldValue) -> AppResult<()> {
    let raw = field_type.serialize(value)?;
    let decoded = field_type.deserialize(&raw)?;
    if &decoded != value {
        return Err(AppError::validation(format!(
            "Field type '{}' changed {value} into {decoded} (stored as {raw:?})",
            field_type.id()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::field_types::builtin::{Checkbox, Number};

    #[test]
    fn test_detects_rejected_values() {
        assert!(check_round_trip(&Checkbox, &json!(true)).is_ok());
        assert!(check_round_trip(&Checkbox, &json!("true")).is_err());
        assert!(check_round_trip(&Number, &json!(1.25)).is_ok());
    }
}
