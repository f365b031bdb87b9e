//! Application configuration.
//!
//! Settings are layered with `figment`, later layers winning:
//!
//! 1. [`Config::default`]
//! 2. `config.toml` in the platform config directory, or an explicit file
//! 3. `ASSET_TIDY_*` environment variables (e.g. `ASSET_TIDY_IO_THREADS=8`)
//! 4. Command-line flags, applied by the caller
//!
//! ```toml
//! io_threads = 8
//! skip_hidden = true
//! ignore_patterns = ["*.map", "node_modules/"]
//! reference_extensions = ["js", "ts", "css", "html"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::actions::DEFAULT_REFERENCE_EXTENSIONS;
use crate::duplicates::DEFAULT_IO_THREADS;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "ASSET_TIDY_";

/// Errors from loading, validating or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A layer could not be parsed or extracted.
    #[error("invalid configuration: {0}")]
    Figment(#[from] Box<figment::Error>),

    /// `io_threads` must be at least 1.
    #[error("io_threads must be at least 1")]
    ZeroIoThreads,

    /// The platform config directory could not be determined.
    #[error("failed to determine the configuration directory")]
    NoConfigDir,

    /// Writing the config file failed.
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serializing to TOML failed.
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Persistent defaults for `find-duplicates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hashing threads.
    pub io_threads: usize,
    /// Extensions whose files are eligible for reference rewriting.
    pub reference_extensions: Vec<String>,
    /// Gitignore-style patterns excluded from scans.
    pub ignore_patterns: Vec<String>,
    /// Skip dot-files and dot-directories.
    pub skip_hidden: bool,
    /// Follow symbolic links while walking.
    pub follow_symlinks: bool,
    /// Byte-for-byte confirmation of hash matches.
    pub paranoid: bool,
    /// Re-hash each file right before removal.
    pub verify_before_remove: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            io_threads: DEFAULT_IO_THREADS,
            reference_extensions: DEFAULT_REFERENCE_EXTENSIONS
                .iter()
                .map(|e| (*e).to_string())
                .collect(),
            ignore_patterns: Vec::new(),
            skip_hidden: false,
            follow_symlinks: false,
            paranoid: false,
            verify_before_remove: false,
        }
    }
}

impl Config {
    /// Load the layered configuration.
    ///
    /// An explicit `path` replaces the platform default file; a missing
    /// default file is simply skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a layer is malformed or the result fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::config_path().ok(),
        };

        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(ref file) = file {
            log::debug!("Reading configuration from {}", file.display());
            figment = figment.merge(Toml::file(file));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX));

        Self::from_figment(&figment)
    }

    /// Extract and validate a config from an already-built figment.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction or validation fails.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroIoThreads`] for `io_threads == 0`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.io_threads == 0 {
            return Err(ConfigError::ZeroIoThreads);
        }
        Ok(())
    }

    /// Write this config as TOML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(io_error)?;
        Ok(())
    }

    /// Platform-specific default configuration path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoConfigDir`] if no home directory is known.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let dirs =
            ProjectDirs::from("dev", "asset-tidy", "asset-tidy").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}
