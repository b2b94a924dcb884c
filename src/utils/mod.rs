//! Utility modules for the batch compressor.

pub mod errors;
pub mod logger;
pub mod size;
