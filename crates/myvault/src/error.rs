//! Vault error types

use std::path::PathBuf;
use thiserror::Error;

/// Vault-specific errors
#[derive(Error, Debug)]
pub enum VaultError {
    /// Input is not a list of records, or a record is incomplete
    #[error("{0}")]
    Validation(String),

    /// File is readable or writable by group/other
    #[error("Insecure file permissions on {path}. Current: {mode:o}. Required: 600")]
    Permission { path: PathBuf, mode: u32 },

    /// Encryption or decryption failed (includes a wrong password)
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Operation precondition not met
    #[error("{0}")]
    Operation(String),

    /// Referenced input file does not exist
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VaultError>;
