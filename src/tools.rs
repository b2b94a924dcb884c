//! External tool discovery.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const SUPPORTED_TOOLS: [&str; 3] = ["7z", "zip", "rar"];

/// Locate an executable by scanning the PATH environment variable.
pub fn find_tool(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    find_in_path(name, &path_var)
}

fn find_in_path(name: &str, path_var: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

/// A regular file with at least one execute bit set. A stray
/// non-executable file named `7z` on PATH must not pass the check.
fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path)
            .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

/// Report the presence and path of every supported archiving tool.
pub fn check_tools() -> Vec<(&'static str, Option<PathBuf>)> {
    info!("=== Checking compression tools ===");
    SUPPORTED_TOOLS
        .iter()
        .map(|tool| {
            let path = find_tool(tool);
            match &path {
                Some(p) => info!("{} found at: {}", tool, p.display()),
                None => warn!("{} NOT found on system.", tool),
            }
            (*tool, path)
        })
        .collect()
}
