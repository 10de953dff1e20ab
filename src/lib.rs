//! Faceted filtering and facet counts over in-memory package catalogs
//!
//! The crate is split into:
//! - `catalog`: items and immutable catalog snapshots
//! - `engine`: predicates, date and text filters, facet counting and
//!   selection reconciliation
//! - `state`: the caller-owned filter state and interactive sessions
//! - `config`: engine configuration and its loader

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod state;

pub use catalog::{CatalogSnapshot, Item, ItemId, ItemStatus};
pub use config::{ConfigLoader, EngineConfig};
pub use engine::{FacetComputation, FacetDimension, FacetEngine};
pub use error::{FacetError, Result};
pub use state::{FacetSession, FacetView, FilterState, SharedSession};
