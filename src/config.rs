//! Configuration management for the batch compressor.
//!
//! Settings come from three layers with explicit precedence: command-line
//! flags win, then the optional TOML config file, then hard defaults.
//! All layers use optional fields, so a value "still at its default" is
//! never mistaken for an explicit override.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cli::{ArchiveFormat, Args};
use crate::utils::errors::CompressError;
use crate::utils::size::parse_size;

pub const DEFAULT_BATCH_SIZE: usize = 80;
pub const DEFAULT_PREFIX: &str = "archive";
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 5;
pub const DEFAULT_THREADS: usize = 1;
pub const DEFAULT_LOGFILE: &str = "batch-compress.log";

/// Characters rejected in archive name prefixes.
const INVALID_PREFIX_CHARS: &str = "<>:\"/\\|?*";

/// Raw values loaded from a TOML config file. Every field is optional;
/// missing keys simply fall through to the defaults.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub batch: Option<usize>,
    pub prefix: Option<String>,
    pub ext: Option<ArchiveFormat>,
    pub auto: Option<bool>,
    pub threads: Option<usize>,
    #[serde(alias = "compression-level")]
    pub compression_level: Option<u32>,
    pub password: Option<String>,
    #[serde(alias = "split-size")]
    pub split_size: Option<String>,
    pub exclude: Option<Vec<String>>,
    pub recursive: Option<bool>,
    pub overwrite: Option<bool>,
    pub verify: Option<bool>,
    pub metadata: Option<PathBuf>,
    pub logfile: Option<PathBuf>,
    pub verbose: Option<bool>,
}

impl FileConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CompressError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| CompressError::Config(format!("{}: {}", path.display(), e)))
    }
}

/// Fully resolved, validated run settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub input: PathBuf,
    pub output: PathBuf,
    pub batch_size: usize,
    pub prefix: String,
    pub ext: ArchiveFormat,
    pub auto: bool,
    pub threads: usize,
    pub dry_run: bool,
    pub compression_level: u32,
    pub password: Option<String>,
    pub split_size: Option<String>,
    pub exclude: Vec<String>,
    pub recursive: bool,
    pub overwrite: bool,
    pub verify: bool,
    pub metadata: Option<PathBuf>,
}

impl Settings {
    /// Merge CLI arguments over file config over defaults, then validate.
    pub fn resolve(args: &Args, file: &FileConfig) -> crate::Result<Self> {
        let input = args
            .input
            .clone()
            .or_else(|| file.input.clone())
            .ok_or_else(|| validation("--input and --output are required"))?;
        let output = args
            .output
            .clone()
            .or_else(|| file.output.clone())
            .ok_or_else(|| validation("--input and --output are required"))?;

        let settings = Settings {
            input,
            output,
            batch_size: args.batch.or(file.batch).unwrap_or(DEFAULT_BATCH_SIZE),
            prefix: args
                .prefix
                .clone()
                .or_else(|| file.prefix.clone())
                .unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            ext: args.ext.or(file.ext).unwrap_or(ArchiveFormat::SevenZ),
            auto: args.auto.or(file.auto).unwrap_or(false),
            threads: args.threads.or(file.threads).unwrap_or(DEFAULT_THREADS),
            dry_run: args.dry_run.unwrap_or(false),
            compression_level: args
                .compression_level
                .or(file.compression_level)
                .unwrap_or(DEFAULT_COMPRESSION_LEVEL),
            password: args.password.clone().or_else(|| file.password.clone()),
            split_size: args.split_size.clone().or_else(|| file.split_size.clone()),
            exclude: args
                .exclude
                .clone()
                .or_else(|| file.exclude.clone())
                .unwrap_or_default(),
            recursive: args.recursive.or(file.recursive).unwrap_or(false),
            overwrite: args.overwrite.or(file.overwrite).unwrap_or(false),
            verify: args.verify.or(file.verify).unwrap_or(false),
            metadata: args.metadata.clone().or_else(|| file.metadata.clone()),
        };

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> crate::Result<()> {
        if self.batch_size < 1 {
            return Err(validation("--batch must be at least 1"));
        }
        if self.threads < 1 {
            return Err(validation("--threads must be at least 1"));
        }
        if self.compression_level > 9 {
            return Err(validation("--compression-level must be between 0 and 9"));
        }
        if !self.input.exists() {
            return Err(validation(&format!(
                "Input folder does not exist: {}",
                self.input.display()
            )));
        }
        if !self.input.is_dir() {
            return Err(validation(&format!(
                "Input path is not a directory: {}",
                self.input.display()
            )));
        }
        if self
            .prefix
            .chars()
            .any(|c| INVALID_PREFIX_CHARS.contains(c))
        {
            return Err(validation(&format!(
                "--prefix contains invalid characters: {}",
                INVALID_PREFIX_CHARS
            )));
        }
        if let Some(split) = &self.split_size {
            parse_size(split)?;
        }
        Ok(())
    }
}

fn validation(msg: &str) -> CompressError {
    CompressError::Validation(msg.to_string())
}
