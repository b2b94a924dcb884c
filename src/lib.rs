//! Batch Compress Library
//!
//! Partitions input files into fixed-size batches and drives the external
//! 7z tool to compress each batch into its own archive, in parallel.

pub mod archiver;
pub mod cli;
pub mod config;
pub mod fs;
pub mod orchestrator;
pub mod plan;
pub mod progress;
pub mod report;
pub mod tools;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::CompressError;
pub type Result<T> = std::result::Result<T, CompressError>;
