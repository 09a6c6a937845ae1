use crate::constants::paths;
use std::path::PathBuf;

/// Where hey keeps its configuration and its conversation cache.
///
/// Resolved once at startup and handed to the components that need it, so
/// tests can point everything at a temporary directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub config_file: String,
    pub cache_dir: PathBuf,
}

impl AppPaths {
    pub fn new(config_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            config_file: paths::CONFIG_FILE.to_string(),
            cache_dir: cache_dir.into(),
        }
    }

    /// Platform defaults with `HEY_CONFIG_PATH`, `HEY_CONFIG_FILENAME` and
    /// `HEY_CACHE_PATH` taking precedence.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let config_dir = non_empty(paths::CONFIG_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::config_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(paths::APP_DIR)
            });
        let cache_dir = non_empty(paths::CACHE_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::cache_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(paths::APP_DIR)
            });
        let config_file =
            non_empty(paths::CONFIG_FILE_ENV).unwrap_or_else(|| paths::CONFIG_FILE.to_string());

        Self {
            config_dir,
            config_file,
            cache_dir,
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(&self.config_file)
    }

    pub fn messages_path(&self) -> PathBuf {
        self.cache_dir.join(paths::MESSAGES_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_env_overrides_win() {
        let env: HashMap<&str, &str> = [
            ("HEY_CONFIG_PATH", "/tmp/hey-config"),
            ("HEY_CONFIG_FILENAME", "alt.toml"),
            ("HEY_CACHE_PATH", "/tmp/hey-cache"),
        ]
        .into_iter()
        .collect();

        let paths = AppPaths::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(paths.config_path(), PathBuf::from("/tmp/hey-config/alt.toml"));
        assert_eq!(
            paths.messages_path(),
            PathBuf::from("/tmp/hey-cache/messages.json")
        );
    }

    #[test]
    fn test_defaults_without_env() {
        let paths = AppPaths::from_lookup(|_| None);
        assert_eq!(paths.config_file, "conf.toml");
        assert!(paths.config_dir.ends_with("hey"));
        assert!(paths.cache_dir.ends_with("hey"));
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let paths = AppPaths::from_lookup(|_| Some(String::new()));
        assert_eq!(paths.config_file, "conf.toml");
        assert!(paths.cache_dir.ends_with("hey"));
    }
}
