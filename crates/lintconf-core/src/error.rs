//! Error types for configuration loading and validation
//!
//! Every error here is raised while a fragment sequence is being loaded.
//! Resolution itself has no failure path.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A `files`, `ignores` or default-ignore glob could not be compiled
    #[error("Invalid glob pattern '{pattern}' in {fragment}: {message}")]
    InvalidPattern {
        pattern: String,
        fragment: String,
        message: String,
    },

    /// A rule value is not one of off/warn/error (or 0/1/2)
    #[error("Invalid severity {value} for rule '{rule}' in {fragment}")]
    InvalidSeverity {
        rule: String,
        fragment: String,
        value: String,
    },

    /// A rule key is empty
    #[error("Empty rule name in {fragment}")]
    InvalidRuleName { fragment: String },

    /// A `files` list is present but contains no patterns
    #[error("Empty 'files' list in {fragment}")]
    EmptyFiles { fragment: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration document could not be deserialized
    #[error("Failed to parse config '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Unsupported config format for '{path}' (expected .json, .jsonc, .json5, .yaml, .yml or .toml)")]
    UnsupportedFormat { path: PathBuf },

    /// `extends` chain refers back to a document already being loaded
    #[error("Circular extends: {chain}")]
    CircularExtends { chain: String },

    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Pattern,
    Severity,
    Validation,
    Io,
    Parse,
}

impl ConfigError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::InvalidPattern { .. } => ErrorKind::Pattern,
            ConfigError::InvalidSeverity { .. } => ErrorKind::Severity,
            ConfigError::InvalidRuleName { .. } => ErrorKind::Validation,
            ConfigError::EmptyFiles { .. } => ErrorKind::Validation,
            ConfigError::CircularExtends { .. } => ErrorKind::Validation,
            ConfigError::Io { .. } => ErrorKind::Io,
            ConfigError::NotFound { .. } => ErrorKind::Io,
            ConfigError::Parse { .. } => ErrorKind::Parse,
            ConfigError::UnsupportedFormat { .. } => ErrorKind::Parse,
        }
    }

    /// Create an invalid pattern error
    pub fn invalid_pattern(
        pattern: impl Into<String>,
        fragment: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            fragment: fragment.into(),
            message: message.into(),
        }
    }

    /// Create an invalid severity error
    pub fn invalid_severity(
        rule: impl Into<String>,
        fragment: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidSeverity {
            rule: rule.into(),
            fragment: fragment.into(),
            value: value.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error with path context
    pub fn parse_error(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
