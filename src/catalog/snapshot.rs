//! Immutable catalog snapshots
//!
//! The metadata store hands the engine a frozen view of its items. Clones
//! share the same allocation, so a snapshot can be moved to a background
//! worker while the store builds the next one.

use super::item::Item;
use crate::{FacetError, Result};
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    items: Arc<[Item]>,
}

/// On-disk document shape: `{ items: [...] }`
#[derive(Debug, Serialize, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    items: Vec<Item>,
}

impl CatalogSnapshot {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items: items.into(),
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Whether two snapshots share the same allocation
    pub fn ptr_eq(&self, other: &CatalogSnapshot) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }

    /// Parse a YAML catalog document (JSON is accepted as a YAML subset)
    pub fn from_yaml(content: &str) -> Result<Self> {
        let document: CatalogDocument = serde_yaml_ng::from_str(content)?;
        Ok(Self::new(document.items))
    }

    pub fn to_yaml(&self) -> Result<String> {
        let document = CatalogDocument {
            items: self.items.to_vec(),
        };
        Ok(serde_yaml_ng::to_string(&document)?)
    }

    /// Load a catalog document from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            FacetError::Catalog(format!(
                "Failed to read catalog file {}: {}",
                path.display(),
                e
            ))
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let snapshot = if is_json {
            let document: CatalogDocument = serde_json::from_str(&content)?;
            Self::new(document.items)
        } else {
            Self::from_yaml(&content)?
        };

        tracing::debug!(
            "Loaded catalog snapshot with {} items from {}",
            snapshot.len(),
            path.display()
        );
        Ok(snapshot)
    }
}

impl Deref for CatalogSnapshot {
    type Target = [Item];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl From<Vec<Item>> for CatalogSnapshot {
    fn from(items: Vec<Item>) -> Self {
        Self::new(items)
    }
}

impl FromIterator<Item> for CatalogSnapshot {
    fn from_iter<T: IntoIterator<Item = Item>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ItemStatus;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clones_share_items() {
        let snapshot = CatalogSnapshot::new(vec![Item::new("a"), Item::new("b")]);
        let copy = snapshot.clone();
        assert!(snapshot.ptr_eq(&copy));
        assert_eq!(copy.len(), 2);
    }

    #[test]
    fn test_yaml_document_round_trip() {
        let snapshot = CatalogSnapshot::new(vec![
            Item::new("a").with_status(ItemStatus::Loaded).with_creator("Alice"),
            Item::new("b").with_category("Scenes"),
        ]);
        let yaml = snapshot.to_yaml().unwrap();
        let parsed = CatalogSnapshot::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.items(), snapshot.items());
    }

    #[test]
    fn test_empty_document() {
        let snapshot = CatalogSnapshot::from_yaml("items: []").unwrap();
        assert!(snapshot.is_empty());
    }
}
