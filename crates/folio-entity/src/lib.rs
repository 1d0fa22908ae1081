//! # folio-entity
//!
//! Domain records for the Folio content backend. These are the shapes
//! plugins see in hook payloads, so changing a field here is a breaking
//! change for every hook subscriber.

pub mod collection;
pub mod entry;
pub mod input;
pub mod media;
pub mod website;

pub use collection::Collection;
pub use entry::{CollectionEntry, CollectionEntryWithData, EntryValue};
pub use input::CollectionInput;
pub use media::Media;
pub use website::Website;
