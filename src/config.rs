//! Application configuration
//!
//! Load order: built-in defaults, then an optional TOML file, then
//! environment overrides. Secrets are never read from the file; the master
//! key comes from `STUDYWELL_MASTER_KEY` only (see `encryption::manager`).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Path of an explicit config file
pub const CONFIG_PATH_ENV: &str = "STUDYWELL_CONFIG";

/// Overrides `data_dir`
pub const DATA_DIR_ENV: &str = "STUDYWELL_DATA_DIR";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Could not determine a data directory; set {}", DATA_DIR_ENV)]
    NoDataDir,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root for learner flashcards and notes
    pub data_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load using the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|name| std::env::var(name).ok())
    }

    /// Load with an injectable environment lookup
    pub fn load_with<F>(env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = env(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .or_else(default_config_path);

        let mut config = match file {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };

        if let Some(dir) = env(DATA_DIR_ENV).filter(|d| !d.trim().is_empty()) {
            config.data_dir = Some(PathBuf::from(dir));
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Resolved data directory
    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|d| d.join("studywell"))
                .ok_or(ConfigError::NoDataDir),
        }
    }

    pub fn learners_dir(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.data_dir()?.join("learners"))
    }

    pub fn notes_dir(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.data_dir()?.join("notes"))
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("studywell").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(vars: HashMap<&'static str, String>) -> impl Fn(&str) -> Option<String> {
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");

        let config = AppConfig::load_with(lookup(HashMap::from([(
            CONFIG_PATH_ENV,
            missing.to_string_lossy().into_owned(),
        )])))
        .unwrap();

        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_file_then_env_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "data_dir = \"/srv/studywell\"\n").unwrap();

        let from_file = AppConfig::load_with(lookup(HashMap::from([(
            CONFIG_PATH_ENV,
            path.to_string_lossy().into_owned(),
        )])))
        .unwrap();
        assert_eq!(from_file.data_dir().unwrap(), PathBuf::from("/srv/studywell"));
        assert_eq!(from_file.notes_dir().unwrap(), PathBuf::from("/srv/studywell/notes"));

        let overridden = AppConfig::load_with(lookup(HashMap::from([
            (CONFIG_PATH_ENV, path.to_string_lossy().into_owned()),
            (DATA_DIR_ENV, "/tmp/override".to_string()),
        ])))
        .unwrap();
        assert_eq!(overridden.learners_dir().unwrap(), PathBuf::from("/tmp/override/learners"));
    }

    #[test]
    fn test_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "data_dir = [").unwrap();

        let err = AppConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Toml { .. }));
    }
}
