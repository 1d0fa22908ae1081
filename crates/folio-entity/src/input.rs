//! Collection input (field declaration) entity model.

use serde::{Deserialize, Serialize};

use folio_core::types::{CollectionId, CollectionInputId};

/// One field declared on a collection, typed by a registered field type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionInput {
    /// Unique input identifier.
    pub id: CollectionInputId,
    /// Owning collection.
    pub collection_id: CollectionId,
    /// Display name.
    pub name: String,
    /// Field-type id this input stores values with.
    pub field_type: String,
    /// Settings serialized by the field type's settings contract.
    pub settings: Option<String>,
    /// Whether entries must supply a value.
    pub is_required: bool,
    /// Display order within the collection.
    pub position: i32,
}

impl CollectionInput {
    /// Create an input with no settings at the end of the collection.
    pub fn new(
        collection_id: CollectionId,
        name: impl Into<String>,
        field_type: impl Into<String>,
    ) -> Self {
        Self {
            id: CollectionInputId::new(),
            collection_id,
            name: name.into(),
            field_type: field_type.into(),
            settings: None,
            is_required: false,
            position: 0,
        }
    }
}
