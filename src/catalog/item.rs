use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Identity key of a catalog item, used for membership lookups in
/// externally owned sets (favorites, auto-install).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Lifecycle status of a package
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemStatus {
    Loaded,
    Available,
    Missing,
    Outdated,
    Updating,
    Archived,
    #[serde(other)]
    Unknown,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 7] = [
        ItemStatus::Loaded,
        ItemStatus::Available,
        ItemStatus::Missing,
        ItemStatus::Outdated,
        ItemStatus::Updating,
        ItemStatus::Archived,
        ItemStatus::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Loaded => "Loaded",
            ItemStatus::Available => "Available",
            ItemStatus::Missing => "Missing",
            ItemStatus::Outdated => "Outdated",
            ItemStatus::Updating => "Updating",
            ItemStatus::Archived => "Archived",
            ItemStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ItemStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown item status '{s}'"))
    }
}

/// One catalog entry.
///
/// All derived flags (duplicate, old version, damaged, ...) arrive already
/// computed by the metadata store; the engine never derives them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,

    /// Display name, searched by the text matcher
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_status")]
    pub status: ItemStatus,

    /// Empty string means no creator
    #[serde(default)]
    pub creator: String,

    /// An item may belong to several categories
    #[serde(default)]
    pub categories: BTreeSet<String>,

    #[serde(default)]
    pub license_type: String,

    #[serde(default)]
    pub file_size_bytes: u64,

    #[serde(default)]
    pub subfolder: String,

    #[serde(default)]
    pub modified_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub is_duplicate: bool,

    #[serde(default)]
    pub is_old_version: bool,

    #[serde(default)]
    pub is_external: bool,

    /// Present only when `is_external`
    #[serde(default)]
    pub external_destination_name: Option<String>,

    #[serde(default)]
    pub is_damaged: bool,

    #[serde(default)]
    pub dependency_count: u32,

    #[serde(default)]
    pub dependents_count: u32,

    #[serde(default)]
    pub is_optimized: bool,

    #[serde(default)]
    pub playlists: BTreeSet<String>,
}

fn default_status() -> ItemStatus {
    ItemStatus::Unknown
}

impl Item {
    /// Create an item with every attribute absent
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(id),
            name: String::new(),
            description: String::new(),
            status: ItemStatus::Unknown,
            creator: String::new(),
            categories: BTreeSet::new(),
            license_type: String::new(),
            file_size_bytes: 0,
            subfolder: String::new(),
            modified_date: None,
            is_duplicate: false,
            is_old_version: false,
            is_external: false,
            external_destination_name: None,
            is_damaged: false,
            dependency_count: 0,
            dependents_count: 0,
            is_optimized: false,
            playlists: BTreeSet::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_status(mut self, status: ItemStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = creator.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.insert(category.into());
        self
    }

    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license_type = license.into();
        self
    }

    pub fn with_size(mut self, bytes: u64) -> Self {
        self.file_size_bytes = bytes;
        self
    }

    pub fn with_subfolder(mut self, subfolder: impl Into<String>) -> Self {
        self.subfolder = subfolder.into();
        self
    }

    pub fn with_modified(mut self, date: DateTime<Utc>) -> Self {
        self.modified_date = Some(date);
        self
    }

    pub fn with_playlist(mut self, playlist: impl Into<String>) -> Self {
        self.playlists.insert(playlist.into());
        self
    }

    /// Mark the item as stored outside the main library
    pub fn external(mut self, destination: impl Into<String>) -> Self {
        self.is_external = true;
        self.external_destination_name = Some(destination.into());
        self
    }

    /// Destination name, only meaningful for external items
    pub fn destination(&self) -> Option<&str> {
        if !self.is_external {
            return None;
        }
        self.external_destination_name
            .as_deref()
            .filter(|name| !name.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_round_trips_through_names() {
        for status in ItemStatus::ALL {
            assert_eq!(status.as_str().parse::<ItemStatus>(), Ok(status));
        }
        assert!("Deleted".parse::<ItemStatus>().is_err());
    }

    #[test]
    fn test_destination_requires_external_flag() {
        let mut item = Item::new("a");
        item.external_destination_name = Some("Backup".to_string());
        assert_eq!(item.destination(), None);

        let item = Item::new("b").external("Backup");
        assert_eq!(item.destination(), Some("Backup"));

        let item = Item::new("c").external("");
        assert_eq!(item.destination(), None);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let yaml = r#"
id: Alice.Scene.3
name: Alice's Scene
status: Loaded
creator: Alice
categories: [Scenes, Looks]
unexpected: ignored
"#;
        let item: Item = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(item.id.as_str(), "Alice.Scene.3");
        assert_eq!(item.status, ItemStatus::Loaded);
        assert_eq!(item.categories.len(), 2);
        assert_eq!(item.modified_date, None);
        assert!(!item.is_external);
    }

    #[test]
    fn test_unrecognised_status_becomes_unknown() {
        let item: Item = serde_json::from_str(r#"{"id":"x","status":"Exploded"}"#).unwrap();
        assert_eq!(item.status, ItemStatus::Unknown);
    }
}
