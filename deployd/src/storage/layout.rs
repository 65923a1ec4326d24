//! Storage layout configuration

use std::path::PathBuf;

/// Environment variable overriding the settings file location
pub const SETTINGS_ENV: &str = "DEPLOYD_SETTINGS";

/// Where deployd keeps its files
#[derive(Debug, Clone)]
pub struct StorageLayout {
    /// Base directory for all storage
    pub base_dir: PathBuf,
}

impl StorageLayout {
    /// Create a new storage layout
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Get the settings file path
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("settings.json")
    }

    /// Resolve the settings file: explicit flag, then environment, then layout default
    pub fn resolve_settings_file(&self, cli_value: Option<&str>) -> PathBuf {
        cli_value
            .map(PathBuf::from)
            .or_else(|| std::env::var_os(SETTINGS_ENV).map(PathBuf::from))
            .unwrap_or_else(|| self.settings_file())
    }
}

impl Default for StorageLayout {
    fn default() -> Self {
        Self::new("/etc/deployd")
    }
}
