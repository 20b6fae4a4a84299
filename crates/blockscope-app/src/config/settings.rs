//! Settings parser for config.toml

use super::types::Settings;
use blockscope_core::prelude::*;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.toml";
const APP_DIR: &str = "blockscope";

const DEFAULT_CONFIG: &str = r#"# blockscope configuration

[records]
# Directory the block detector writes records into.
# directory = "/path/to/blockcanary"
max_stored_count = 30

[filter]
# Delete the files of whitelisted records instead of only hiding them
delete_files_in_whitelist = true
# Hide records with no frame in the concern packages
filter_non_concern_stack = false
whitelist = ["org.chromium"]
# Package prefixes of interest (empty = the recorded process name)
concern_packages = []

[ui]
# "cost" or "recency"
default_sort = "cost"

[watcher]
enabled = true
debounce_ms = 500
"#;

/// Default location of config.toml
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(CONFIG_FILENAME)
}

/// Load settings from a config file, falling back to defaults
///
/// A missing or unparseable file is not an error: the defaults are used and
/// the problem is logged.
pub fn load_settings_from(config_path: &Path) -> Settings {
    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

/// Write a commented default config file if none exists
///
/// Returns the path of the config file.
pub fn init_config_file(config_path: &Path) -> Result<PathBuf> {
    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::config(format!("Failed to create {:?}: {}", parent, e)))?;
        }
    }

    if !config_path.exists() {
        std::fs::write(config_path, DEFAULT_CONFIG)
            .map_err(|e| Error::config(format!("Failed to write {:?}: {}", config_path, e)))?;
        info!("Created default config at {:?}", config_path);
    }

    Ok(config_path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockscope_core::SortKey;
    use tempfile::tempdir;

    #[test]
    fn test_load_settings_defaults() {
        let temp = tempdir().unwrap();
        let settings = load_settings_from(&temp.path().join("config.toml"));

        assert!(settings.filter.delete_files_in_whitelist);
        assert_eq!(settings.records.max_stored_count, 30);
    }

    #[test]
    fn test_load_settings_custom() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        let config = r#"
[records]
directory = "/data/blocks"
max_stored_count = 50

[filter]
delete_files_in_whitelist = false
filter_non_concern_stack = true
whitelist = ["com.vendor.ads"]
concern_packages = ["com.example"]

[ui]
default_sort = "recency"
"#;
        std::fs::write(&path, config).unwrap();

        let settings = load_settings_from(&path);

        assert_eq!(
            settings.records.directory,
            Some(PathBuf::from("/data/blocks"))
        );
        assert_eq!(settings.records.max_stored_count, 50);
        assert!(!settings.filter.delete_files_in_whitelist);
        assert!(settings.filter.filter_non_concern_stack);
        assert_eq!(settings.filter.whitelist, vec!["com.vendor.ads".to_string()]);
        assert_eq!(settings.filter.concern_packages, vec!["com.example".to_string()]);
        assert_eq!(settings.ui.default_sort, SortKey::Recency);
    }

    #[test]
    fn test_load_settings_invalid_toml() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "not valid toml {{{{").unwrap();

        let settings = load_settings_from(&path);
        assert!(settings.filter.delete_files_in_whitelist);
    }

    #[test]
    fn test_init_config_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let written = init_config_file(&path).unwrap();
        assert_eq!(written, path);
        assert!(path.exists());

        let settings = load_settings_from(&path);
        assert_eq!(settings.filter.whitelist, vec!["org.chromium".to_string()]);
    }

    #[test]
    fn test_init_config_file_keeps_existing() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[ui]\ndefault_sort = \"recency\"\n").unwrap();

        init_config_file(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("recency"));
        assert!(!content.contains("[watcher]"));
    }
}
