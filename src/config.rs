use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::language::Language;

/// Persisted user preferences; command line flags take precedence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub language: Language,
    pub number_of_words: usize,
    pub duration_secs: u64,
    pub online: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: Language::English,
            number_of_words: 200,
            duration_secs: 60,
            online: false,
        }
    }
}

impl Config {
    /// Replaces values a session cannot run with by their defaults
    pub fn sanitized(self) -> Self {
        let defaults = Config::default();
        let mut cfg = self;
        if cfg.number_of_words == 0 {
            log::warn!(
                "config number_of_words must be at least 1, using {}",
                defaults.number_of_words
            );
            cfg.number_of_words = defaults.number_of_words;
        }
        if cfg.duration_secs == 0 {
            log::warn!(
                "config duration_secs must be at least 1, using {}",
                defaults.duration_secs
            );
            cfg.duration_secs = defaults.duration_secs;
        }
        cfg
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("typometer_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => cfg.sanitized(),
                Err(e) => {
                    log::warn!("ignoring invalid config {}: {e}", self.path.display());
                    Config::default()
                }
            },
            Err(_) => Config::default(),
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nope.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn test_invalid_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{ "language": "portuguese" }"#).unwrap();

        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.language, Language::Portuguese);
        assert_eq!(cfg.number_of_words, 200);
        assert_eq!(cfg.duration_secs, 60);
    }

    #[test]
    fn test_zero_values_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            br#"{ "language": "portuguese", "number_of_words": 0, "duration_secs": 0 }"#,
        )
        .unwrap();

        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.language, Language::Portuguese);
        assert_eq!(cfg.number_of_words, 200);
        assert_eq!(cfg.duration_secs, 60);
    }

    #[test]
    fn test_sanitized_keeps_valid_values() {
        let cfg = Config {
            language: Language::English,
            number_of_words: 5,
            duration_secs: 1,
            online: true,
        };
        assert_eq!(cfg.clone().sanitized(), cfg);
    }
}
