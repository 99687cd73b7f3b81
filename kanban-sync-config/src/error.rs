//! Error types for the kanban-sync configuration system

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration parsing failed
    #[error("Failed to parse configuration{}: {source}", path_suffix(.path))]
    ParseError {
        path: Option<PathBuf>,
        source: Box<figment::Error>,
    },

    /// Invalid configuration value
    #[error("Invalid configuration value for key '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

fn path_suffix(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!(" ({})", path.display()),
        None => String::new(),
    }
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::ParseError {
            path: None,
            source: Box::new(error),
        }
    }
}

impl ConfigError {
    /// Create a parse error, optionally attributed to a file
    pub fn parse_error(path: Option<PathBuf>, source: figment::Error) -> Self {
        Self::ParseError {
            path,
            source: Box::new(source),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}
