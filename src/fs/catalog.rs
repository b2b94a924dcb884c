//! File discovery and filtering.
//!
//! Enumerates candidate files under a root directory, applies exclusion
//! globs, and produces a deterministic sorted catalog for batch planning.
//! Files are only stat'ed for size; contents are never opened.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Options for building the file catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogOptions {
    /// Scan subdirectories recursively
    pub recursive: bool,

    /// Exclusion patterns (glob-style)
    pub exclude_patterns: Vec<String>,
}

/// A file discovered under the input root.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Full path to the file
    pub path: PathBuf,

    /// Path relative to the input root
    pub relative_path: PathBuf,

    /// File size in bytes
    pub size: u64,
}

impl FileEntry {
    /// Base name of the file, for logging and report records.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Build the sorted, deduplicated catalog of files under `root`.
///
/// In flat mode only direct children are considered and exclusion
/// patterns match the base name. In recursive mode the whole tree is
/// walked and patterns match the base name or the relative path.
/// The caller is expected to have validated that `root` exists and is
/// a directory.
pub fn build_catalog(root: &Path, options: &CatalogOptions) -> crate::Result<Vec<FileEntry>> {
    let excludes = build_exclude_set(&options.exclude_patterns)?;

    let mut walker = WalkDir::new(root).min_depth(1);
    if !options.recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path().to_path_buf();
        let relative_path = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
        if is_excluded(&excludes, &entry, &relative_path, options.recursive) {
            continue;
        }

        let size = entry.metadata().map_err(std::io::Error::from)?.len();
        files.push(FileEntry {
            path,
            relative_path,
            size,
        });
    }

    // Full-path string ordering keeps batch assignment reproducible
    // across runs and platforms.
    files.sort_by(|a, b| a.path.as_os_str().cmp(b.path.as_os_str()));
    files.dedup_by(|a, b| a.path == b.path);
    Ok(files)
}

fn build_exclude_set(patterns: &[String]) -> crate::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

fn is_excluded(
    excludes: &GlobSet,
    entry: &walkdir::DirEntry,
    relative_path: &Path,
    recursive: bool,
) -> bool {
    if excludes.is_empty() {
        return false;
    }
    if excludes.is_match(entry.file_name()) {
        return true;
    }
    recursive && excludes.is_match(relative_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn options(recursive: bool, patterns: &[&str]) -> CatalogOptions {
        CatalogOptions {
            recursive,
            exclude_patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_empty_directory() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        let files = build_catalog(temp_dir.path(), &CatalogOptions::default()).unwrap();
        assert!(files.is_empty());
        Ok(())
    }

    #[test]
    fn test_flat_collects_direct_children_only() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        fs::write(temp_dir.path().join("file1.txt"), b"content1")?;
        fs::write(temp_dir.path().join("file2.txt"), b"content2")?;
        fs::create_dir(temp_dir.path().join("subdir"))?;
        fs::write(temp_dir.path().join("subdir/nested.txt"), b"nested")?;

        let files = build_catalog(temp_dir.path(), &CatalogOptions::default()).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].name(), "file1.txt");
        assert_eq!(files[0].size, 8);
        Ok(())
    }

    #[test]
    fn test_recursive_collects_nested_files() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        fs::write(temp_dir.path().join("file1.txt"), b"content1")?;
        fs::create_dir(temp_dir.path().join("subdir"))?;
        fs::write(temp_dir.path().join("subdir/nested.txt"), b"nested")?;

        let files = build_catalog(temp_dir.path(), &options(true, &[])).unwrap();
        assert_eq!(files.len(), 2);
        Ok(())
    }

    #[test]
    fn test_exclude_patterns_by_basename() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        fs::write(temp_dir.path().join("a.log"), b"log")?;
        fs::write(temp_dir.path().join("b.tmp"), b"tmp")?;
        fs::write(temp_dir.path().join("c.txt"), b"txt")?;

        let files =
            build_catalog(temp_dir.path(), &options(false, &["*.log", "*.tmp"])).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name(), "c.txt");
        Ok(())
    }

    #[test]
    fn test_exclude_applies_in_subdirs() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        fs::create_dir(temp_dir.path().join("sub"))?;
        fs::write(temp_dir.path().join("sub/a.log"), b"log")?;
        fs::write(temp_dir.path().join("sub/keep.txt"), b"keep")?;

        let files = build_catalog(temp_dir.path(), &options(true, &["*.log"])).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].relative_path, Path::new("sub/keep.txt"));
        Ok(())
    }

    #[test]
    fn test_exclude_by_relative_path_in_recursive_mode() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        fs::create_dir(temp_dir.path().join("cache"))?;
        fs::write(temp_dir.path().join("cache/data.bin"), b"cached")?;
        fs::write(temp_dir.path().join("data.bin"), b"keep")?;

        let files = build_catalog(temp_dir.path(), &options(true, &["cache/*"])).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].relative_path, Path::new("data.bin"));
        Ok(())
    }

    #[test]
    fn test_sorted_output() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        for name in ["zebra.txt", "apple.txt", "mango.txt"] {
            fs::write(temp_dir.path().join(name), b"x")?;
        }

        let files = build_catalog(temp_dir.path(), &CatalogOptions::default()).unwrap();
        let names: Vec<String> = files.iter().map(|f| f.name()).collect();
        assert_eq!(names, ["apple.txt", "mango.txt", "zebra.txt"]);
        Ok(())
    }
}
