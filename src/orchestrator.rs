//! Batch orchestration.
//!
//! Runs every planned batch under a bounded worker pool. Each worker
//! owns one batch end-to-end (compress, then optional verify) and any
//! fault is caught at the batch boundary, so sibling batches in flight
//! are never affected. Outcomes flow through a channel and are folded
//! into the report by a single aggregation loop.

use std::io::Write;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, info, warn};

use crate::archiver::{self, CompressOptions};
use crate::plan::{transition, Batch, BatchOutcome, BatchStatus, Plan};
use crate::progress::ProgressReporter;
use crate::report::RunReport;
use crate::utils::size::format_size;

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Worker pool bound
    pub threads: usize,

    /// Run `7z t` on each produced archive
    pub verify: bool,

    /// Plan and preview only
    pub dry_run: bool,

    /// Skip the confirmation prompt
    pub auto: bool,

    pub compress: CompressOptions,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub executed: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Execute the plan and return the aggregate counters.
///
/// In dry-run mode only the preview is logged: no external process is
/// spawned and no confirmation prompt is shown. Declining the prompt
/// returns an all-zero summary, which is not a failure.
pub async fn run(
    plan: &Plan,
    opts: &RunOptions,
    progress: &dyn ProgressReporter,
    report: &mut RunReport,
) -> RunSummary {
    for batch in &plan.batches {
        info!(
            "Batch {}/{}: {} files ({}) -> {}",
            batch.index,
            plan.total_batches,
            batch.files.len(),
            format_size(batch.input_size),
            batch.archive_name()
        );
        for file in &batch.files {
            debug!("  - {}", file.name());
        }
    }

    if opts.dry_run {
        info!("=== DRY RUN COMPLETE - No changes made ===");
        return RunSummary {
            executed: plan.batches.len(),
            succeeded: plan.batches.len(),
            failed: 0,
        };
    }

    if !opts.auto && !confirm(plan.batches.len()) {
        warn!("Operation cancelled by user.");
        return RunSummary::default();
    }

    progress.begin(plan.batches.len());

    let semaphore = Arc::new(Semaphore::new(opts.threads.max(1)));
    let compress = Arc::new(opts.compress.clone());
    let verify = opts.verify;
    let (tx, mut rx) = mpsc::unbounded_channel::<BatchOutcome>();

    let mut handles = Vec::with_capacity(plan.batches.len());
    for batch in plan.batches.iter().cloned() {
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();
        let compress = Arc::clone(&compress);
        let index = batch.index;

        let handle = tokio::spawn(async move {
            let _permit = match sem.acquire_owned().await {
                Ok(permit) => permit,
                // Semaphore is never closed while workers are alive
                Err(_) => return,
            };
            let outcome = process_batch(batch, &compress, verify).await;
            let _ = tx.send(outcome);
        });
        handles.push((index, handle));
    }
    drop(tx);

    // Single aggregation step: counters and the report are only touched
    // here, never from inside a worker.
    let mut summary = RunSummary::default();
    while let Some(outcome) = rx.recv().await {
        summary.executed += 1;
        if outcome.status == BatchStatus::Done {
            summary.succeeded += 1;
        } else {
            summary.failed += 1;
            if let Some(err) = &outcome.error {
                error!("Batch {} failed: {}", outcome.index, err);
            }
        }
        report.record(&outcome);
        progress.advance();
    }

    // A worker that panicked never sent an outcome; count it as a
    // failure for that batch alone.
    for (index, handle) in handles {
        if let Err(join_err) = handle.await {
            error!("Batch {} worker fault: {}", index, join_err);
            summary.executed += 1;
            summary.failed += 1;
        }
    }

    progress.finish();
    summary
}

/// Compress one batch and, when requested, verify the produced archive.
/// All errors terminate in the returned outcome.
async fn process_batch(batch: Batch, opts: &CompressOptions, verify: bool) -> BatchOutcome {
    let archive_name = batch.archive_name();
    let files: Vec<String> = batch.files.iter().map(|f| f.name()).collect();
    let mut status = transition(batch.index, BatchStatus::Planned, BatchStatus::Running);

    info!(
        "Compressing {} files into {}",
        batch.files.len(),
        archive_name
    );

    let (status, output_size, error) = match archiver::compress_batch(&batch, opts).await {
        Ok(size) => {
            status = transition(batch.index, status, BatchStatus::Compressed);
            info!("Successfully created {}", archive_name);
            if verify {
                status = transition(batch.index, status, BatchStatus::Verifying);
                match archiver::verify::verify_archive(&opts.tool, &batch.target).await {
                    Ok(()) => {
                        status = transition(batch.index, status, BatchStatus::Verified);
                        (transition(batch.index, status, BatchStatus::Done), size, None)
                    }
                    Err(err) => (
                        transition(batch.index, status, BatchStatus::VerifyFailed),
                        size,
                        Some(err.to_string()),
                    ),
                }
            } else {
                (transition(batch.index, status, BatchStatus::Done), size, None)
            }
        }
        Err(err) => (
            transition(batch.index, status, BatchStatus::Failed),
            None,
            Some(err.to_string()),
        ),
    };

    BatchOutcome {
        index: batch.index,
        archive_name,
        status,
        file_count: batch.files.len(),
        input_size: batch.input_size,
        output_size,
        files,
        error,
    }
}

/// Single blocking confirmation before the pool starts.
fn confirm(count: usize) -> bool {
    print!("\nProceed with compression of {} batch(es)? (y/n): ", count);
    let _ = std::io::stdout().flush();

    let mut line = String::new();
    match std::io::stdin().read_line(&mut line) {
        Ok(_) => line.trim().eq_ignore_ascii_case("y"),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::catalog::{build_catalog, CatalogOptions};
    use crate::plan::{plan_batches, PlanOptions};
    use crate::progress::NoopReporter;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn plan_from_dir(input: &Path, output: &Path, batch_size: usize) -> Plan {
        let catalog = build_catalog(input, &CatalogOptions::default()).unwrap();
        plan_batches(
            catalog,
            &PlanOptions {
                batch_size,
                output_dir: output.to_path_buf(),
                prefix: "archive".to_string(),
                extension: "7z".to_string(),
                overwrite: false,
            },
        )
    }

    fn run_options(dry_run: bool) -> RunOptions {
        RunOptions {
            threads: 2,
            verify: false,
            dry_run,
            auto: true,
            compress: CompressOptions {
                level: 5,
                ..CompressOptions::default()
            },
        }
    }

    fn empty_report(plan: &Plan) -> RunReport {
        RunReport::new(
            Path::new("/in"),
            Path::new("/out"),
            plan.total_files,
            plan.total_input_size,
            5,
            5,
        )
    }

    #[tokio::test]
    async fn test_dry_run_creates_nothing() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        for i in 0..10 {
            fs::write(input.path().join(format!("f{}.txt", i)), b"data").unwrap();
        }

        let plan = plan_from_dir(input.path(), output.path(), 5);
        assert_eq!(plan.total_batches, 2);
        assert!(plan.total_input_size > 0);

        let mut report = empty_report(&plan);
        let summary = run(&plan, &run_options(true), &NoopReporter, &mut report).await;

        assert_eq!(summary.executed, 2);
        assert_eq!(summary.failed, 0);
        assert_eq!(fs::read_dir(output.path()).unwrap().count(), 0);
        assert!(report.archives.is_empty());
    }

    /// Write a stand-in archiver: `a` creates the target archive and
    /// exits 0; `t` fails with a diagnostic for archives matching
    /// `fail_glob` and passes otherwise.
    #[cfg(unix)]
    fn fake_archiver(dir: &Path, fail_glob: &str) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("7z");
        let body = format!(
            "#!/bin/sh\n\
             if [ \"$1\" = t ]; then\n\
             \x20 case \"$2\" in {fail_glob}) echo 'CRC Failed' >&2; exit 2 ;; esac\n\
             \x20 exit 0\n\
             fi\n\
             shift\n\
             for arg in \"$@\"; do\n\
             \x20 case \"$arg\" in -*) ;; *) : > \"$arg\"; break ;; esac\n\
             done\n\
             exit 0\n"
        );
        fs::write(&script, body).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_verification_failure_moves_counters_by_exactly_one() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let bin = TempDir::new().unwrap();
        for i in 0..4 {
            fs::write(input.path().join(format!("f{}.txt", i)), b"data").unwrap();
        }

        // Compression succeeds for both batches; only archive_1 fails
        // its integrity check.
        let tool = fake_archiver(bin.path(), "*archive_1*");
        let plan = plan_from_dir(input.path(), output.path(), 2);
        let opts = RunOptions {
            threads: 2,
            verify: true,
            dry_run: false,
            auto: true,
            compress: CompressOptions {
                level: 5,
                tool,
                ..CompressOptions::default()
            },
        };

        let mut report = empty_report(&plan);
        let summary = run(&plan, &opts, &NoopReporter, &mut report).await;

        // The verify failure converts one compression success into a
        // failure; it must not be counted on both sides.
        assert_eq!(summary.executed, 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(report.archives.len(), 1);
        assert_eq!(report.archives[0].batch_num, 2);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_verified_batches_all_succeed() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let bin = TempDir::new().unwrap();
        for i in 0..4 {
            fs::write(input.path().join(format!("f{}.txt", i)), b"data").unwrap();
        }

        // Glob matches nothing, so every integrity check passes.
        let tool = fake_archiver(bin.path(), "*no-such-archive*");
        let plan = plan_from_dir(input.path(), output.path(), 2);
        let opts = RunOptions {
            threads: 2,
            verify: true,
            dry_run: false,
            auto: true,
            compress: CompressOptions {
                level: 5,
                tool,
                ..CompressOptions::default()
            },
        };

        let mut report = empty_report(&plan);
        let summary = run(&plan, &opts, &NoopReporter, &mut report).await;

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 0);
        assert_eq!(report.archives.len(), 2);
    }

    #[tokio::test]
    async fn test_every_batch_gets_exactly_one_outcome() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        for i in 0..4 {
            fs::write(input.path().join(format!("f{}.txt", i)), b"data").unwrap();
        }

        let plan = plan_from_dir(input.path(), output.path(), 2);
        let mut report = empty_report(&plan);
        // Works whether or not 7z is installed: each batch must end in a
        // terminal state and be counted exactly once.
        let summary = run(&plan, &run_options(false), &NoopReporter, &mut report).await;

        assert_eq!(summary.executed, 2);
        assert_eq!(summary.succeeded + summary.failed, 2);
        assert_eq!(report.archives.len(), summary.succeeded);
    }
}
