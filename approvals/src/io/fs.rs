//! Filesystem probes used before a reporter launch.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read};
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::debug;

/// Bytes inspected when deciding whether a file is binary.
const PROBE_BYTES: u64 = 8000;

/// Fail unless `path` exists. Callers treat a missing file as a contract violation.
pub fn assert_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("file not found: {}", path.display());
    }
    Ok(())
}

/// Create an empty file at `path` (and its parent directories) unless one exists.
///
/// Returns `true` when a file was created.
pub fn create_empty_file_if_missing(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(_) => {
            debug!(path = %path.display(), "created empty approved file");
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e).with_context(|| format!("create empty file {}", path.display())),
    }
}

/// Whether the file's content should be treated as binary rather than text.
pub fn is_binary_file(path: &Path) -> Result<bool> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut sample = Vec::new();
    file.take(PROBE_BYTES)
        .read_to_end(&mut sample)
        .with_context(|| format!("read {}", path.display()))?;
    Ok(is_binary_content(&sample))
}

/// Classify a content sample.
///
/// Binary when it contains a NUL byte, carries a known binary signature, or
/// more than a tenth of its bytes are non-text control characters.
pub fn is_binary_content(sample: &[u8]) -> bool {
    if sample.is_empty() {
        return false;
    }
    if sample.contains(&0) {
        return true;
    }
    if let Some(kind) = infer::get(sample) {
        use infer::MatcherType::{App, Archive, Audio, Font, Image, Video};
        if matches!(
            kind.matcher_type(),
            App | Archive | Audio | Font | Image | Video
        ) {
            return true;
        }
    }
    let suspicious = sample
        .iter()
        .filter(|&&b| b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r' | 0x08 | 0x0c | 0x1b))
        .count();
    suspicious * 10 > sample.len()
}
