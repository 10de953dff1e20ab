pub mod loader;
pub mod types;

pub use loader::{user_config_path, ConfigLoader, PROJECT_CONFIG_FILE};
pub use types::{EngineConfig, Settings, SizeBucket};
