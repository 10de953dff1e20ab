use super::types::EngineConfig;
use crate::engine::classify::validate_buckets;
use crate::engine::status::is_status_value;
use crate::{FacetError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name looked up in a project root
pub const PROJECT_CONFIG_FILE: &str = "catalog-facets.yaml";

/// Configuration loader for engine config files
pub struct ConfigLoader {
    /// Cache loaded configs
    cache: std::collections::HashMap<PathBuf, (EngineConfig, std::time::SystemTime)>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            cache: std::collections::HashMap::new(),
        }
    }

    /// Load a config file; `.json` files are read as JSON, anything else
    /// as YAML
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<EngineConfig> {
        let path = path.as_ref();

        // Check cache first
        if let Some((cached, cached_time)) = self.cache.get(path) {
            if let Ok(modified) = std::fs::metadata(path).and_then(|m| m.modified()) {
                if modified <= *cached_time {
                    return Ok(cached.clone());
                }
            }
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            FacetError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config: EngineConfig = if is_json {
            serde_json::from_str(&contents).map_err(|e| {
                FacetError::Config(format!(
                    "Failed to parse config file {}: {}",
                    path.display(),
                    e
                ))
            })?
        } else {
            serde_yaml_ng::from_str(&contents).map_err(|e| {
                FacetError::Config(format!(
                    "Failed to parse config file {}: {}",
                    path.display(),
                    e
                ))
            })?
        };

        Self::validate(&config)?;
        debug!("Loaded config from {}", path.display());

        if let Ok(modified) = std::fs::metadata(path).and_then(|m| m.modified()) {
            self.cache
                .insert(path.to_path_buf(), (config.clone(), modified));
        }

        Ok(config)
    }

    /// Resolve the effective config: the project file wins over the user
    /// file, and defaults apply when neither loads.
    pub fn load_hierarchy<P: AsRef<Path>>(&mut self, project_root: P) -> EngineConfig {
        let user_path = user_config_path();
        self.load_hierarchy_from(project_root, user_path.as_deref())
    }

    /// `load_hierarchy` with an explicit user config location
    pub fn load_hierarchy_from<P: AsRef<Path>>(
        &mut self,
        project_root: P,
        user_config: Option<&Path>,
    ) -> EngineConfig {
        let project_path = project_root.as_ref().join(PROJECT_CONFIG_FILE);
        let candidates = std::iter::once(project_path).chain(user_config.map(Path::to_path_buf));

        for path in candidates {
            if !path.exists() {
                continue;
            }
            match self.load_file(&path) {
                Ok(config) => return config,
                Err(e) => {
                    // Don't fail entirely, fall through to the next source
                    warn!("Failed to load config file {}: {}", path.display(), e);
                }
            }
        }

        debug!("No config file found, using defaults");
        EngineConfig::default()
    }

    /// Validate config structure and content
    fn validate(config: &EngineConfig) -> Result<()> {
        if config.search_fields.is_empty() {
            return Err(FacetError::Config(
                "search_fields must name at least one field".to_string(),
            ));
        }

        validate_buckets(&config.file_size_buckets)?;

        for (from, to) in &config.label_aliases {
            if from.is_empty() || to.is_empty() {
                return Err(FacetError::Config(format!(
                    "Label alias '{}' -> '{}' has an empty side",
                    from, to
                )));
            }
            if from == to {
                return Err(FacetError::Config(format!(
                    "Label alias '{}' maps onto itself",
                    from
                )));
            }
            if !is_status_value(from) && !is_status_value(to) {
                return Err(FacetError::Config(format!(
                    "Label alias '{}' -> '{}' names no Status value",
                    from, to
                )));
            }
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// `<user config dir>/catalog-facets/config.yaml`, when a home directory
/// can be determined
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "catalog-facets")
        .map(|dirs| dirs.config_dir().join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_load_valid_config() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(PROJECT_CONFIG_FILE);

        let content = r#"settings:
  cascade_mode: true
search_fields: [name, categories]
file_size_buckets:
  - label: Small
    max_bytes: 1048576
  - label: Large
label_aliases:
  Installed: Loaded
"#;

        let mut file = File::create(&config_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();

        let mut loader = ConfigLoader::new();
        let config = loader.load_file(&config_path).unwrap();

        assert!(config.settings.cascade_mode);
        assert_eq!(config.search_fields.len(), 2);
        assert_eq!(config.file_size_buckets.len(), 2);
        assert_eq!(config.file_size_buckets[1].max_bytes, None);
        assert_eq!(config.label_aliases.get("Installed").map(String::as_str), Some("Loaded"));
    }

    #[test]
    fn test_validate_unordered_buckets() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(PROJECT_CONFIG_FILE);

        let content = r#"file_size_buckets:
  - label: Large
    max_bytes: 100
  - label: Small
    max_bytes: 10
"#;

        let mut file = File::create(&config_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();

        let mut loader = ConfigLoader::new();
        let result = loader.load_file(&config_path);

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("max_bytes"));
    }

    #[test]
    fn test_validate_self_alias() {
        let mut config = EngineConfig::default();
        config
            .label_aliases
            .insert("Loaded".to_string(), "Loaded".to_string());
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[test]
    fn test_validate_alias_needs_status_value() {
        let mut config = EngineConfig::default();
        config
            .label_aliases
            .insert("Installed".to_string(), "Present".to_string());
        let err = ConfigLoader::validate(&config).unwrap_err();
        assert!(err.to_string().contains("names no Status value"));

        // Either side may carry the recognised name
        let mut config = EngineConfig::default();
        config
            .label_aliases
            .insert("Loaded".to_string(), "Installed".to_string());
        assert!(ConfigLoader::validate(&config).is_ok());
    }
}
