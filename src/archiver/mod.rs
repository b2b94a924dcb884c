//! External archiving tool invocation.
//!
//! The actual compression is delegated to the 7z executable; this module
//! only builds its command line, runs it and interprets the exit status.

pub mod verify;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::fs::catalog::FileEntry;
use crate::plan::Batch;
use crate::utils::errors::CompressError;

pub const SEVEN_ZIP: &str = "7z";

/// Pass-through options for the external tool.
#[derive(Debug, Clone)]
pub struct CompressOptions {
    /// Compression level 0-9 (`-mx=`)
    pub level: u32,

    /// Optional encryption password
    pub password: Option<String>,

    /// Optional split volume size (e.g. "100M")
    pub split_size: Option<String>,

    /// Archiver binary to invoke, as resolved by the startup
    /// availability check. Resolution is not a guarantee: the spawn can
    /// still fail with `ToolUnavailable` if the binary disappears.
    pub tool: PathBuf,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            level: 0,
            password: None,
            split_size: None,
            tool: PathBuf::from(SEVEN_ZIP),
        }
    }
}

/// Build the 7z argument list for compressing one batch.
///
/// A password always comes paired with `-mhe=on`: encrypting file
/// contents while leaving archive headers readable is not offered.
pub fn build_compress_args(
    target: &Path,
    files: &[FileEntry],
    opts: &CompressOptions,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        OsString::from("a"),
        OsString::from(format!("-mx={}", opts.level)),
        target.as_os_str().to_os_string(),
    ];

    if let Some(password) = &opts.password {
        args.push(OsString::from(format!("-p{}", password)));
        args.push(OsString::from("-mhe=on"));
    }

    if let Some(split) = &opts.split_size {
        args.push(OsString::from(format!("-v{}", split)));
    }

    for file in files {
        args.push(file.path.as_os_str().to_os_string());
    }

    args
}

/// Compress one batch into its target archive.
///
/// Returns the produced archive's size on success, or `None` when the
/// tool exited zero but the target file is absent (split archives land
/// as `.001` volumes, for example). A missing 7z binary maps to
/// `ToolUnavailable` so the caller can fail just this batch.
pub async fn compress_batch(batch: &Batch, opts: &CompressOptions) -> crate::Result<Option<u64>> {
    let args = build_compress_args(&batch.target, &batch.files, opts);
    debug!("Executing: {} {}", opts.tool.display(), display_args(&args));

    let output = Command::new(&opts.tool)
        .args(&args)
        .output()
        .await
        .map_err(|e| spawn_error(&opts.tool, e))?;

    if output.status.success() {
        match tokio::fs::metadata(&batch.target).await {
            Ok(meta) => Ok(Some(meta.len())),
            Err(_) => {
                warn!(
                    "Archive {} missing after successful exit, size unknown",
                    batch.target.display()
                );
                Ok(None)
            }
        }
    } else {
        Err(CompressError::Execution {
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

pub(crate) fn spawn_error(tool: &Path, err: std::io::Error) -> CompressError {
    match err.kind() {
        std::io::ErrorKind::NotFound => CompressError::ToolUnavailable {
            tool: tool.display().to_string(),
        },
        _ => CompressError::Io(err),
    }
}

fn display_args(args: &[OsString]) -> String {
    args.iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
