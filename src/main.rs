//! batch-compress - Main entry point
//!
//! CLI utility for batch compressing files using 7z.

use anyhow::Result;
use batch_compress::archiver::{CompressOptions, SEVEN_ZIP};
use batch_compress::cli::Args;
use batch_compress::config::{FileConfig, DEFAULT_LOGFILE};
use batch_compress::fs::catalog::{build_catalog, CatalogOptions};
use batch_compress::orchestrator::{self, RunOptions};
use batch_compress::plan::{plan_batches, PlanOptions};
use batch_compress::report::RunReport;
use batch_compress::utils::size::format_size;
use batch_compress::{progress, tools, utils, CompressError, Settings};
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {}", err);
            match err.downcast_ref::<CompressError>() {
                Some(CompressError::Validation(_))
                | Some(CompressError::Config(_))
                | Some(CompressError::Pattern(_)) => ExitCode::from(2),
                _ => ExitCode::from(1),
            }
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    // Load config file if provided; CLI flags take precedence over it
    let file_cfg = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };

    let logfile = args
        .logfile
        .clone()
        .or_else(|| file_cfg.logfile.clone())
        .unwrap_or_else(|| DEFAULT_LOGFILE.into());
    let verbose = args.verbose.or(file_cfg.verbose).unwrap_or(false);
    utils::logger::init(&logfile, verbose)?;

    debug!("batch-compress version {}", env!("CARGO_PKG_VERSION"));

    if args.check {
        tools::check_tools();
        return Ok(ExitCode::SUCCESS);
    }

    let settings = Settings::resolve(&args, &file_cfg)?;

    // Global availability check before starting; individual batches
    // still handle the tool disappearing mid-run.
    let seven_zip = match tools::find_tool(SEVEN_ZIP) {
        Some(path) => path,
        None => {
            error!("7z not found in PATH. Please install 7-Zip first.");
            error!("Download from: https://www.7-zip.org/");
            return Ok(ExitCode::from(1));
        }
    };

    let catalog = build_catalog(
        &settings.input,
        &CatalogOptions {
            recursive: settings.recursive,
            exclude_patterns: settings.exclude.clone(),
        },
    )?;

    if catalog.is_empty() {
        error!("No files found in folder: {}", settings.input.display());
        return Ok(ExitCode::SUCCESS);
    }

    let total_files = catalog.len();
    let total_input_size: u64 = catalog.iter().map(|f| f.size).sum();
    info!(
        "Found {} files ({}), will create {} archive(s)",
        total_files,
        format_size(total_input_size),
        total_files.div_ceil(settings.batch_size)
    );

    if !settings.exclude.is_empty() {
        info!("Excluding patterns: {}", settings.exclude.join(", "));
    }

    if settings.dry_run {
        info!("=== DRY RUN MODE - No files will be created ===");
    } else {
        std::fs::create_dir_all(&settings.output)?;
    }

    let plan = plan_batches(
        catalog,
        &PlanOptions {
            batch_size: settings.batch_size,
            output_dir: settings.output.clone(),
            prefix: settings.prefix.clone(),
            extension: settings.ext.extension().to_string(),
            overwrite: settings.overwrite,
        },
    );

    if plan.batches.is_empty() {
        info!("No batches to process (all archives exist)");
        return Ok(ExitCode::SUCCESS);
    }

    let mut report = RunReport::new(
        &settings.input,
        &settings.output,
        plan.total_files,
        plan.total_input_size,
        settings.batch_size,
        settings.compression_level,
    );

    let reporter = progress::resolve(settings.dry_run);
    let run_opts = RunOptions {
        threads: settings.threads,
        verify: settings.verify,
        dry_run: settings.dry_run,
        auto: settings.auto,
        compress: CompressOptions {
            level: settings.compression_level,
            password: settings.password.clone(),
            split_size: settings.split_size.clone(),
            tool: seven_zip,
        },
    };

    let summary = orchestrator::run(&plan, &run_opts, reporter.as_ref(), &mut report).await;
    report.finalize();

    if let Some(metadata) = &settings.metadata {
        if !settings.dry_run && summary.succeeded > 0 {
            report.write(metadata)?;
            info!("Metadata exported to {}", metadata.display());
        }
    }

    let total = summary.succeeded + summary.failed;
    if total > 0 {
        info!("{}", "=".repeat(50));
        info!("SUMMARY");
        info!("{}", "=".repeat(50));
        info!("Total batches:    {}", total);
        info!("Successful:       {}", summary.succeeded);
        info!("Failed:           {}", summary.failed);
        info!("Input size:       {}", format_size(plan.total_input_size));

        if report.total_output_size > 0 {
            info!("Output size:      {}", format_size(report.total_output_size));
            info!("Compression:      {:.1}% reduced", report.compression_ratio);
        }

        if summary.failed > 0 {
            warn!("Some batches failed. Check log for details.");
            return Ok(ExitCode::from(1));
        }
    }

    Ok(ExitCode::SUCCESS)
}
