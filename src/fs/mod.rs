//! File system operations.

pub mod catalog;
