//! Command-line interface definition.
//!
//! Every value-carrying flag is an `Option` so that "not given on the
//! command line" is distinguishable from "explicitly set to the default";
//! config-file merging relies on that (see `config::Settings::resolve`).

use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

/// Supported archive formats. 7z creates all of them, picking the
/// container from the target file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    #[value(name = "7z")]
    #[serde(rename = "7z")]
    SevenZ,
    Zip,
    Rar,
}

impl ArchiveFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ArchiveFormat::SevenZ => "7z",
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::Rar => "rar",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "batch-compress", version, about = "Compress files in batches using 7z")]
pub struct Args {
    /// Path to input folder
    #[arg(long, value_name = "DIR")]
    pub input: Option<PathBuf>,

    /// Path to output folder
    #[arg(long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Number of files per batch (default: 80)
    #[arg(long, value_name = "N")]
    pub batch: Option<usize>,

    /// Prefix for archive file names (default: archive)
    #[arg(long)]
    pub prefix: Option<String>,

    /// Archive extension (default: 7z)
    #[arg(long, value_enum)]
    pub ext: Option<ArchiveFormat>,

    /// Run automatically without confirmation
    #[arg(long, num_args = 0, default_missing_value = "true", action = clap::ArgAction::Set)]
    pub auto: Option<bool>,

    /// Number of parallel workers (default: 1)
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// Preview operations without executing
    #[arg(long, num_args = 0, default_missing_value = "true", action = clap::ArgAction::Set)]
    pub dry_run: Option<bool>,

    /// Compression level 0-9 (default: 5)
    #[arg(long, value_name = "LEVEL")]
    pub compression_level: Option<u32>,

    /// Password for encrypted archives (header encryption is always enabled)
    #[arg(long)]
    pub password: Option<String>,

    /// Split archive into volumes (e.g. 100M, 1G)
    #[arg(long, value_name = "SIZE")]
    pub split_size: Option<String>,

    /// Glob pattern to exclude (can be used multiple times)
    #[arg(long, value_name = "PATTERN")]
    pub exclude: Option<Vec<String>>,

    /// Scan subdirectories recursively
    #[arg(short, long, num_args = 0, default_missing_value = "true", action = clap::ArgAction::Set)]
    pub recursive: Option<bool>,

    /// Overwrite existing archives
    #[arg(long, num_args = 0, default_missing_value = "true", action = clap::ArgAction::Set)]
    pub overwrite: Option<bool>,

    /// Verify archives after creation
    #[arg(long, num_args = 0, default_missing_value = "true", action = clap::ArgAction::Set)]
    pub verify: Option<bool>,

    /// Export run metadata to a JSON file
    #[arg(long, value_name = "FILE")]
    pub metadata: Option<PathBuf>,

    /// Check if 7z, zip, rar tools are available
    #[arg(long)]
    pub check: bool,

    /// Load settings from a TOML config file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log file path (default: batch-compress.log)
    #[arg(long, value_name = "FILE")]
    pub logfile: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short, long, num_args = 0, default_missing_value = "true", action = clap::ArgAction::Set)]
    pub verbose: Option<bool>,
}
