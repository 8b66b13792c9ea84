//! Configuration for the image cache and file request root.
//!
//! Configuration can be loaded from a TOML file, environment variables, or
//! created programmatically.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const MB: usize = 1024 * 1024;

/// `None` if the size does not fit in `usize` bytes
fn mb_to_bytes(mb: usize) -> Option<usize> {
    mb.checked_mul(MB)
}

/// Configuration shared by the image cache and file requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Image cache capacity in bytes
    pub image_cache_bytes: usize,
    /// Directory relative file requests resolve against
    pub file_root: PathBuf,
}

/// On-disk representation, sizes in megabytes
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    image_cache_mb: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_root: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            image_cache_bytes: 32 * MB,
            file_root: Self::default_file_root(),
        }
    }
}

impl CacheConfig {
    /// Creates a configuration with the image cache size in megabytes.
    pub fn new(image_cache_mb: usize, file_root: PathBuf) -> Self {
        Self {
            image_cache_bytes: image_cache_mb.saturating_mul(MB),
            file_root,
        }
    }

    /// Sets the image cache size in megabytes, saturating at `usize::MAX` bytes.
    pub fn with_image_cache_mb(mut self, mb: usize) -> Self {
        self.image_cache_bytes = mb.saturating_mul(MB);
        self
    }

    /// Sets the image cache size in bytes.
    pub fn with_image_cache_bytes(mut self, bytes: usize) -> Self {
        self.image_cache_bytes = bytes;
        self
    }

    /// Sets the file request root directory.
    pub fn with_file_root<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.file_root = path.as_ref().to_path_buf();
        self
    }

    /// Returns the default file root for the current platform.
    ///
    /// - macOS: ~/Library/Caches/imgreq/files
    /// - Linux: ~/.cache/imgreq/files
    /// - Windows: %LOCALAPPDATA%\imgreq\files
    pub fn default_file_root() -> PathBuf {
        match dirs::cache_dir() {
            Some(cache_dir) => cache_dir.join("imgreq").join("files"),
            None => PathBuf::from("cache/files"),
        }
    }

    /// Loads configuration from environment variables.
    ///
    /// Environment variables:
    /// - `IMGREQ_IMAGE_CACHE_MB`: image cache size in MB (default: 32)
    /// - `IMGREQ_FILE_ROOT`: file request root directory
    ///
    /// # Errors
    /// Returns an error if any environment variable contains an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("IMGREQ_IMAGE_CACHE_MB") {
            let bytes = val
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(mb_to_bytes)
                .ok_or_else(|| ConfigError::InvalidValue("IMGREQ_IMAGE_CACHE_MB".to_string()))?;
            config.image_cache_bytes = bytes;
        }

        if let Ok(val) = std::env::var("IMGREQ_FILE_ROOT") {
            config.file_root = PathBuf::from(val);
        }

        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// Expected file format:
    /// ```toml
    /// image_cache_mb = 32
    /// file_root = "/path/to/files"
    /// ```
    /// Missing keys keep their defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(toml_str)?;
        let mut config = Self::default();
        if let Some(mb) = file.image_cache_mb {
            config.image_cache_bytes = mb_to_bytes(mb)
                .ok_or_else(|| ConfigError::InvalidValue("image_cache_mb".to_string()))?;
        }
        if let Some(root) = file.file_root {
            config.file_root = root;
        }
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path.as_ref(), self.to_toml()?)?;
        Ok(())
    }

    /// Converts configuration to TOML format.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        let file = ConfigFile {
            image_cache_mb: Some(self.image_cache_mb()),
            file_root: Some(self.file_root.clone()),
        };
        Ok(toml::to_string(&file)?)
    }

    /// Returns the image cache size in megabytes.
    pub fn image_cache_mb(&self) -> usize {
        self.image_cache_bytes / MB
    }
}

/// Errors that can occur during configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for configuration key: {0}")]
    InvalidValue(String),
    #[error("could not parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
