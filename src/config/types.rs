use crate::engine::text::SearchField;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Global settings for the facet engine
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Settings {
    /// Start sessions in cascading count mode
    #[serde(default)]
    pub cascade_mode: bool,

    /// Enable verbose debug logging
    #[serde(default)]
    pub debug_mode: bool,
}

/// One file-size bucket. Buckets are tried in order; an item lands in the
/// first bucket whose `max_bytes` it does not exceed. A bucket without
/// `max_bytes` catches everything left and must come last.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SizeBucket {
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bytes: Option<u64>,
}

impl SizeBucket {
    pub fn new(label: impl Into<String>, max_bytes: Option<u64>) -> Self {
        Self {
            label: label.into(),
            max_bytes,
        }
    }
}

/// Root configuration file structure for catalog-facets.yaml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    #[serde(default)]
    pub settings: Settings,

    /// Item fields searched by the free-text query
    #[serde(default = "SearchField::defaults")]
    pub search_fields: Vec<SearchField>,

    /// Size buckets in display order; empty disables the File Size facet
    #[serde(default)]
    pub file_size_buckets: Vec<SizeBucket>,

    /// Extra value-name equivalences used when re-applying selections
    #[serde(default)]
    pub label_aliases: BTreeMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            search_fields: SearchField::defaults(),
            file_size_buckets: Vec::new(),
            label_aliases: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert!(!settings.cascade_mode);
        assert!(!settings.debug_mode);
    }

    #[test]
    fn test_missing_sections_take_defaults() {
        let config: EngineConfig = serde_yaml_ng::from_str("settings:\n  cascade_mode: true\n").unwrap();
        assert!(config.settings.cascade_mode);
        assert_eq!(config.search_fields, SearchField::defaults());
        assert!(config.file_size_buckets.is_empty());
        assert!(config.label_aliases.is_empty());
    }
}
