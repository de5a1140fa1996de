//! Buffer manager configuration
//!
//! Settings are read from a JSON document; every field is optional and
//! falls back to its default.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_NUM_FRAMES: usize = 64;

/// Configuration error types
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read
    Io(std::io::Error),
    /// Config document is not valid JSON for BufferConfig
    Parse(serde_json::Error),
    /// A setting is out of range
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "I/O error: {}", err),
            ConfigError::Parse(err) => write!(f, "Parse error: {}", err),
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Buffer manager settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BufferConfig {
    /// Number of frames in the pool
    pub num_frames: usize,
    /// Initial reference bit of a page that just became resident
    pub refbit_on_load: bool,
    /// Directory holding page files
    pub data_dir: PathBuf,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            num_frames: DEFAULT_NUM_FRAMES,
            refbit_on_load: true,
            data_dir: PathBuf::from("./data"),
        }
    }
}

impl BufferConfig {
    /// Parses and validates a JSON config document
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: BufferConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON config file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Checks that every setting is in range
    pub fn validate(&self) -> ConfigResult<()> {
        if self.num_frames == 0 {
            return Err(ConfigError::Invalid(
                "num_frames must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
