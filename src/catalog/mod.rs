//! Catalog data model
//!
//! Items are read-only for the duration of a recomputation; a snapshot is
//! the unit the engine filters over.

mod item;
mod snapshot;

pub use item::{Item, ItemId, ItemStatus};
pub use snapshot::CatalogSnapshot;
