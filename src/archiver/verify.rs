//! Archive integrity checking via `7z t`.

use std::ffi::OsString;
use std::path::Path;
use tokio::process::Command;
use tracing::info;

use super::spawn_error;
use crate::utils::errors::CompressError;

pub fn build_verify_args(archive: &Path) -> Vec<OsString> {
    vec![OsString::from("t"), archive.as_os_str().to_os_string()]
}

/// Run the tool's integrity-check mode against a produced archive.
pub async fn verify_archive(tool: &Path, archive: &Path) -> crate::Result<()> {
    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| archive.display().to_string());
    info!("Verifying {}...", name);

    let output = Command::new(tool)
        .args(build_verify_args(archive))
        .output()
        .await
        .map_err(|e| spawn_error(tool, e))?;

    if output.status.success() {
        info!("Verification passed: {}", name);
        Ok(())
    } else {
        Err(CompressError::Verification {
            archive: name,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_args() {
        let args = build_verify_args(Path::new("/out/archive_1.7z"));
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args, ["t", "/out/archive_1.7z"]);
    }
}
