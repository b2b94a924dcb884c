//! Batch planning.
//!
//! Partitions the sorted catalog into contiguous fixed-size batches and
//! assigns each a target archive path. Batches whose target already
//! exists are dropped from the plan unless overwrite was requested, so
//! re-runs leave previously produced archives untouched.

use std::path::PathBuf;
use tracing::{debug, warn};

use crate::fs::catalog::FileEntry;

/// Lifecycle of a single batch.
///
/// `Planned -> Running -> Compressed -> Verifying -> Verified -> Done`
/// on the happy path with verification enabled; `Failed`, `VerifyFailed`
/// and `Skipped` are the other terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Planned,
    Running,
    Compressed,
    Verifying,
    Verified,
    VerifyFailed,
    Done,
    Failed,
    Skipped,
}

/// Record a state transition for one batch and return the new state.
pub fn transition(index: usize, from: BatchStatus, to: BatchStatus) -> BatchStatus {
    debug!("Batch {}: {:?} -> {:?}", index, from, to);
    to
}

/// A contiguous group of files destined for one archive.
#[derive(Debug, Clone)]
pub struct Batch {
    /// 1-based batch number
    pub index: usize,

    /// Member files, in catalog order
    pub files: Vec<FileEntry>,

    /// Target archive path
    pub target: PathBuf,

    /// Sum of member file sizes
    pub input_size: u64,
}

impl Batch {
    /// Base name of the target archive, for logging.
    pub fn archive_name(&self) -> String {
        self.target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.target.display().to_string())
    }
}

/// Terminal result of one dispatched batch, produced by the worker that
/// processed it.
#[derive(Debug)]
pub struct BatchOutcome {
    pub index: usize,
    pub archive_name: String,
    pub status: BatchStatus,
    pub file_count: usize,
    pub input_size: u64,
    pub output_size: Option<u64>,
    pub files: Vec<String>,
    pub error: Option<String>,
}

/// Options for batch planning.
#[derive(Debug, Clone)]
pub struct PlanOptions {
    pub batch_size: usize,
    pub output_dir: PathBuf,
    pub prefix: String,
    pub extension: String,
    pub overwrite: bool,
}

/// The execution plan for one run.
#[derive(Debug)]
pub struct Plan {
    /// `ceil(total_files / batch_size)`, before skip filtering
    pub total_batches: usize,

    /// Number of files in the catalog
    pub total_files: usize,

    /// Sum of all catalog file sizes
    pub total_input_size: u64,

    /// Batches dropped because their target archive already exists
    pub skipped: usize,

    /// Batches to execute
    pub batches: Vec<Batch>,
}

/// Partition the sorted catalog into batches.
///
/// Batch k (1-based) contains catalog entries at offsets
/// `[(k-1)*batch_size, k*batch_size)`; membership depends only on the
/// catalog order and the batch size.
pub fn plan_batches(files: Vec<FileEntry>, opts: &PlanOptions) -> Plan {
    let total_files = files.len();
    let total_input_size: u64 = files.iter().map(|f| f.size).sum();
    let total_batches = total_files.div_ceil(opts.batch_size);

    let mut batches = Vec::new();
    let mut skipped = 0;

    for (k, chunk) in files.chunks(opts.batch_size).enumerate() {
        let index = k + 1;
        let target = opts
            .output_dir
            .join(format!("{}_{}.{}", opts.prefix, index, opts.extension));

        if target.exists() && !opts.overwrite {
            let name = target
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| target.display().to_string());
            warn!(
                "Skipping {} (already exists, use --overwrite to replace)",
                name
            );
            transition(index, BatchStatus::Planned, BatchStatus::Skipped);
            skipped += 1;
            continue;
        }

        batches.push(Batch {
            index,
            input_size: chunk.iter().map(|f| f.size).sum(),
            files: chunk.to_vec(),
            target,
        });
    }

    Plan {
        total_batches,
        total_files,
        total_input_size,
        skipped,
        batches,
    }
}
