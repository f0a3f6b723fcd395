//! Error types for the testweaver CLI
//!
//! Parse and validation errors abort before any remote call is made; a
//! remote call error aborts the run at the point of failure with no
//! automatic rollback of resources created before it.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the testweaver CLI
#[derive(Error, Debug)]
pub enum Error {
    // === Structure File Errors ===
    #[error("failed to parse structure file as YAML or JSON\n  YAML: {yaml}\n  JSON: {json}")]
    Parse { yaml: String, json: String },

    #[error("invalid structure: {0}")]
    Validation(String),

    // === Remote Call Errors ===
    #[error("remote call '{operation}' failed: {message}")]
    RemoteCall { operation: String, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    // === Configuration Errors ===
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create a remote call error with the failing operation name
    pub fn remote_call(operation: &str, message: impl Into<String>) -> Self {
        Self::RemoteCall {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a file read error
    pub fn file_read(path: &std::path::Path, error: impl std::fmt::Display) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }
}
