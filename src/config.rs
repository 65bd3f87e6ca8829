use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
const CONFIG_FILE: &str = "config.json";
const SESSION_FILE: &str = "session.json";
const LOG_FILE: &str = "cinephile.log";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse config file {0}: {1}")]
    Parse(PathBuf, serde_json::Error),

    #[error("Could not determine home directory")]
    NoHomeDirectory,
}

/// Client configuration, loaded from `config.json` in the platform config
/// directory. Every field is optional in the file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Base URL of the recommendation API, without a trailing path.
    pub backend_url: String,
    /// Per-request timeout. `None` waits forever.
    pub request_timeout_secs: Option<u64>,
    /// Number of placeholder cards drawn while a grid is loading.
    pub skeleton_cards: usize,
    pub session_file: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout_secs: Some(30),
            skeleton_cards: 8,
            session_file: None,
            log_file: None,
            log_filter: "cinephile=info".to_string(),
        }
    }
}

impl Config {
    /// Load from an explicit path, or from the default location when `path`
    /// is `None`. A missing default file yields the defaults; a missing
    /// explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_path() {
                Ok(p) => (p, false),
                Err(_) => return Ok(Self::default()),
            },
        };

        if !required && !path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(&path).map_err(|e| ConfigError::Read(path.clone(), e))?;
        Self::from_json(&content).map_err(|e| ConfigError::Parse(path, e))
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(project_dirs()?.config_dir().join(CONFIG_FILE))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn session_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.session_file {
            Some(p) => Ok(p.clone()),
            None => Ok(project_dirs()?.data_dir().join(SESSION_FILE)),
        }
    }

    pub fn log_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.log_file {
            Some(p) => Ok(p.clone()),
            None => Ok(project_dirs()?.data_dir().join(LOG_FILE)),
        }
    }
}

fn project_dirs() -> Result<directories::ProjectDirs, ConfigError> {
    directories::ProjectDirs::from("com", "cinephile", "cinephile")
        .ok_or(ConfigError::NoHomeDirectory)
}
