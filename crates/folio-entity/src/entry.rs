//! Collection entry entity models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_core::types::{CollectionId, CollectionInputId, EntryId};

/// An entry row without its field values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionEntry {
    /// Unique entry identifier.
    pub id: EntryId,
    /// Owning collection.
    pub collection_id: CollectionId,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
    /// When the entry was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A single persisted field value of an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryValue {
    /// Input the value belongs to.
    pub input_id: CollectionInputId,
    /// Field-type id the value was serialized with.
    pub field_type: String,
    /// Serialized value; `None` when the entry leaves the input empty.
    pub value: Option<String>,
}

/// An entry together with all of its field values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionEntryWithData {
    /// The entry row.
    #[serde(flatten)]
    pub entry: CollectionEntry,
    /// Field values keyed by input.
    pub data: Vec<EntryValue>,
}

impl CollectionEntryWithData {
    /// Create an empty entry in the given collection.
    pub fn new(collection_id: CollectionId) -> Self {
        let now = Utc::now();
        Self {
            entry: CollectionEntry {
                id: EntryId::new(),
                collection_id,
                created_at: now,
                updated_at: now,
            },
            data: Vec::new(),
        }
    }

    /// Serialized value stored for an input, if any.
    pub fn value_for(&self, input_id: CollectionInputId) -> Option<&str> {
        self.data
            .iter()
            .find(|v| v.input_id == input_id)
            .and_then(|v| v.value.as_deref())
    }

    /// Add or replace the value stored for an input.
    pub fn set_value(
        &mut self,
        input_id: CollectionInputId,
        field_type: impl Into<String>,
        value: Option<String>,
    ) {
        let field_type = field_type.into();
        match self.data.iter_mut().find(|v| v.input_id == input_id) {
            Some(existing) => {
                existing.field_type = field_type;
                existing.value = value;
            }
            None => self.data.push(EntryValue {
                input_id,
                field_type,
                value,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_value_replaces_existing() {
        let mut entry = CollectionEntryWithData::new(CollectionId::new());
        let input = CollectionInputId::new();

        entry.set_value(input, "text", Some("draft".to_string()));
        entry.set_value(input, "text", Some("final".to_string()));

        assert_eq!(entry.data.len(), 1);
        assert_eq!(entry.value_for(input), Some("final"));
        assert_eq!(entry.value_for(CollectionInputId::new()), None);
    }

    #[test]
    fn test_entry_serializes_flat() {
        let entry = CollectionEntryWithData::new(CollectionId::new());
        let json = serde_json::to_value(&entry).expect("serialize");
        assert!(json.get("id").is_some());
        assert!(json.get("collectionId").is_some());
        assert!(json.get("data").is_some());
    }
}
