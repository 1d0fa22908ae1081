//! Field-type registry and the built-in field types.
//!
//! A field type owns the wire format of one kind of entry value. The
//! persistence layer only ever stores the string a field type produces,
//! so every value must survive `serialize` followed by `deserialize`.

pub mod builtin;
pub mod context;
pub mod definition;
pub mod registry;
pub mod round_trip;

pub use context::{ApiUrlBuilder, AuthenticatedDataPort, FieldContext, LoopbackDataPort};
pub use definition::{
    FieldType, FieldValue, InputProps, JsonSettings, RenderedView, SettingsContract, SettingsProps,
};
pub use registry::{FieldTypeError, FieldTypeRegistry};
pub use round_trip::check_round_trip;
