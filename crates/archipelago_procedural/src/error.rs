//! # World Generation Error Types
//!
//! Generation and sampling never fail. Only loading a [`WorldConfig`]
//! from disk or text can.
//!
//! [`WorldConfig`]: crate::config::WorldConfig

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or validating a world configuration.
#[derive(Error, Debug)]
pub enum WorldGenError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// The file that was requested.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The configuration text is not valid TOML for a `WorldConfig`.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The configuration could not be written back out as TOML.
    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// The configuration parsed but holds values generation cannot use.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for world generation configuration operations.
pub type WorldGenResult<T> = Result<T, WorldGenError>;
