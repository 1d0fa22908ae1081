//! Field types that ship with Folio.

mod checkbox;
mod number;
mod select;
mod text;

use std::sync::Arc;

pub use checkbox::Checkbox;
pub use number::{Number, NumberSettings};
pub use select::{Select, SelectSettings};
pub use text::{Text, TextSettings};

use super::FieldType;

/// Built-in field types, keyed by the plugin name used in manifests.
pub fn builtin_field_types() -> Vec<(&'static str, Arc<dyn FieldType>)> {
    vec![
        ("checkbox", Arc::new(Checkbox) as Arc<dyn FieldType>),
        ("text", Arc::new(Text)),
        ("number", Arc::new(Number)),
        ("select", Arc::new(Select)),
    ]
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::Value;

    use super::*;
    use crate::field_types::round_trip::check_round_trip;

    proptest! {
        #[test]
        fn checkbox_round_trips(b in any::<bool>()) {
            prop_assert!(check_round_trip(&Checkbox, &Value::Bool(b)).is_ok());
        }

        #[test]
        fn text_round_trips(s in any::<String>()) {
            prop_assert!(check_round_trip(&Text, &Value::String(s)).is_ok());
        }

        #[test]
        fn select_round_trips(s in any::<String>()) {
            prop_assert!(check_round_trip(&Select, &Value::String(s)).is_ok());
        }

        #[test]
        fn integer_round_trips(n in any::<i64>()) {
            prop_assert!(check_round_trip(&Number, &Value::from(n)).is_ok());
        }

        #[test]
        fn float_round_trips(f in -1.0e12f64..1.0e12f64) {
            prop_assert!(check_round_trip(&Number, &Value::from(f)).is_ok());
        }
    }

    #[test]
    fn test_builtin_names_match_ids() {
        for (name, field_type) in builtin_field_types() {
            assert_eq!(name, field_type.id());
        }
    }
}
