//! Structured run report.
//!
//! Accumulates per-batch outcomes into an exportable JSON record. The
//! report is written once, after orchestration completes, never
//! incrementally, so a crash can not leave a partial file behind.

use serde::Serialize;
use std::path::Path;

use crate::plan::{BatchOutcome, BatchStatus};

/// One per-batch record in the exported report.
#[derive(Debug, Serialize)]
pub struct ArchiveRecord {
    pub batch_num: usize,
    pub archive_name: String,
    pub file_count: usize,
    pub input_size: u64,
    pub output_size: Option<u64>,
    pub files: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub created_at: String,
    pub input_folder: String,
    pub output_folder: String,
    pub total_files: usize,
    pub total_input_size: u64,
    pub batch_size: usize,
    pub compression_level: u32,
    pub archives: Vec<ArchiveRecord>,
    pub total_output_size: u64,
    pub compression_ratio: f64,
}

impl RunReport {
    pub fn new(
        input: &Path,
        output: &Path,
        total_files: usize,
        total_input_size: u64,
        batch_size: usize,
        compression_level: u32,
    ) -> Self {
        Self {
            created_at: chrono::Local::now().to_rfc3339(),
            input_folder: input.display().to_string(),
            output_folder: output.display().to_string(),
            total_files,
            total_input_size,
            batch_size,
            compression_level,
            archives: Vec::new(),
            total_output_size: 0,
            compression_ratio: 0.0,
        }
    }

    /// Fold one batch outcome into the report. Only fully successful
    /// batches get an archive record; a batch that failed verification
    /// is excluded so it is never counted on both sides.
    pub fn record(&mut self, outcome: &BatchOutcome) {
        if outcome.status != BatchStatus::Done {
            return;
        }
        if let Some(size) = outcome.output_size {
            self.total_output_size += size;
        }
        self.archives.push(ArchiveRecord {
            batch_num: outcome.index,
            archive_name: outcome.archive_name.clone(),
            file_count: outcome.file_count,
            input_size: outcome.input_size,
            output_size: outcome.output_size,
            files: outcome.files.clone(),
        });
    }

    /// Compute the derived totals. The ratio is a reduction percentage,
    /// defined as 0 when there was no input.
    pub fn finalize(&mut self) {
        self.compression_ratio = if self.total_input_size > 0 {
            (1.0 - self.total_output_size as f64 / self.total_input_size as f64) * 100.0
        } else {
            0.0
        };
    }

    /// Serialize the report to `path` as pretty-printed JSON.
    pub fn write(&self, path: &Path) -> crate::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
