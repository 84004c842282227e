//! Directory listing for baseline-shaped files.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use glob::Pattern;
use tracing::debug;
use walkdir::WalkDir;

use crate::core::path::{join_under, normalize_path};

/// Default file-name pattern identifying approved baselines.
pub const DEFAULT_APPROVED_PATTERN: &str = "*.approved.*";

/// Lists files beneath a directory whose file name matches a pattern.
pub trait ApprovedFileLister {
    /// Return every matching file anywhere beneath `dir`, spelled as
    /// `dir` joined with the path relative to it.
    fn list(&self, dir: &str, pattern: &Pattern) -> Result<Vec<String>>;
}

/// Recursive lister backed by `walkdir`.
pub struct WalkdirLister;

impl ApprovedFileLister for WalkdirLister {
    fn list(&self, dir: &str, pattern: &Pattern) -> Result<Vec<String>> {
        let root = Path::new(dir);
        if !root.is_dir() {
            debug!(dir, "approved directory missing, nothing to scan");
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(root) {
            let entry = entry.with_context(|| format!("walk {dir}"))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            if !pattern.matches(name) {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(root)
                .map_err(|e| anyhow!("{} outside {dir}: {e}", entry.path().display()))?;
            files.push(join_under(
                dir,
                &normalize_path(&relative.to_string_lossy()),
            ));
        }
        files.sort();
        debug!(dir, count = files.len(), "scanned for approved files");
        Ok(files)
    }
}

/// Compile a file-name glob.
pub fn compile_pattern(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).with_context(|| format!("invalid glob pattern {pattern:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn lists_matching_files_recursively() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path();
        fs::create_dir_all(root.join("a/deep")).expect("mkdir");
        fs::write(root.join("a/x.approved.txt"), "").expect("write");
        fs::write(root.join("a/x.received.txt"), "").expect("write");
        fs::write(root.join("a/deep/y.approved.json"), "").expect("write");

        let dir = normalize_path(&root.join("a").to_string_lossy());
        let pattern = compile_pattern(DEFAULT_APPROVED_PATTERN).expect("pattern");
        let files = WalkdirLister.list(&dir, &pattern).expect("list");

        assert_eq!(
            files,
            vec![
                format!("{dir}/deep/y.approved.json"),
                format!("{dir}/x.approved.txt"),
            ]
        );
    }

    #[test]
    fn missing_directory_lists_nothing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dir = normalize_path(&temp.path().join("gone").to_string_lossy());
        let pattern = compile_pattern(DEFAULT_APPROVED_PATTERN).expect("pattern");
        assert!(WalkdirLister.list(&dir, &pattern).expect("list").is_empty());
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = compile_pattern("[").unwrap_err();
        assert!(err.to_string().contains("invalid glob pattern"));
    }
}
