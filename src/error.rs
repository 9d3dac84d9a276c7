// src/error.rs

//! Crate-wide error type and result alias

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the compatibility analysis engine
#[derive(Error, Debug)]
pub enum Error {
    /// An index configuration file is missing or unreadable. Fatal for the
    /// named index; resolution against it cannot proceed.
    #[error("Index configuration error for '{path}': {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("Index query failed: {0}")]
    Index(String),

    #[error("Failed to run '{command}': {reason}")]
    Command { command: String, reason: String },

    #[error("Required tool not found in PATH: {0}")]
    ToolMissing(String),

    #[error("Package not found: {0}")]
    PackageNotFound(String),

    #[error("Malformed ABI export dump: {0}")]
    AbiDump(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, Error>;
