//! Custom error types for the batch compressor.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompressError {
    #[error("Invalid argument: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid exclude pattern: {0}")]
    Pattern(#[from] globset::Error),

    #[error("{tool} not found in PATH")]
    ToolUnavailable { tool: String },

    #[error("7z exited with status {status}: {stderr}")]
    Execution { status: i32, stderr: String },

    #[error("Verification failed for {archive}: {stderr}")]
    Verification { archive: String, stderr: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CompressError>;
