//! Stale-approval audit.
//!
//! Directories are the unit of search: every directory holding an expected
//! baseline is scanned recursively, so baselines left behind by renamed or
//! deleted tests are found even though no expected path names them.

use anyhow::{Result, bail};
use glob::Pattern;
use tracing::{debug, instrument, warn};

use crate::core::stale::{ExpectedApprovals, stale_message, stale_paths};
use crate::io::config::ApprovalsConfig;
use crate::io::discovery::{
    ApprovedFileLister, DEFAULT_APPROVED_PATTERN, WalkdirLister, compile_pattern,
};

/// Predicate exempting a normalized discovered path from the stale check.
pub type IgnorePredicate = Box<dyn Fn(&str) -> bool>;

/// Options controlling one audit.
pub struct AuditConfig {
    pub error_on_stale_approved_files: bool,
    pub approved_file_pattern: Pattern,
    pub should_ignore: Option<IgnorePredicate>,
}

impl AuditConfig {
    /// Audit enabled, default baseline pattern, nothing ignored.
    pub fn enabled() -> Result<Self> {
        Ok(Self {
            error_on_stale_approved_files: true,
            approved_file_pattern: compile_pattern(DEFAULT_APPROVED_PATTERN)?,
            should_ignore: None,
        })
    }

    /// Build from the file config; `stale_ignore` globs become the ignore predicate.
    pub fn from_config(cfg: &ApprovalsConfig) -> Result<Self> {
        let ignore = cfg.stale_ignore_patterns()?;
        let should_ignore: Option<IgnorePredicate> = if ignore.is_empty() {
            None
        } else {
            Some(Box::new(move |path: &str| {
                ignore.iter().any(|p| p.matches(path))
            }))
        };
        Ok(Self {
            error_on_stale_approved_files: cfg.error_on_stale_approved_files,
            approved_file_pattern: compile_pattern(&cfg.approved_file_pattern)?,
            should_ignore,
        })
    }

    pub fn with_ignore<F: Fn(&str) -> bool + 'static>(mut self, predicate: F) -> Self {
        self.should_ignore = Some(Box::new(predicate));
        self
    }

    fn ignores(&self, path: &str) -> bool {
        self.should_ignore.as_ref().is_some_and(|f| f(path))
    }
}

/// Compares the baselines a run referenced against those present on disk.
pub struct StaleApprovalAuditor<L: ApprovedFileLister = WalkdirLister> {
    lister: L,
}

impl Default for StaleApprovalAuditor<WalkdirLister> {
    fn default() -> Self {
        Self::new(WalkdirLister)
    }
}

impl<L: ApprovedFileLister> StaleApprovalAuditor<L> {
    pub fn new(lister: L) -> Self {
        Self { lister }
    }

    /// Discovered baselines that no expected path names, sorted.
    ///
    /// Runs regardless of `error_on_stale_approved_files`.
    #[instrument(skip_all)]
    pub fn find_stale_approvals<S: AsRef<str>>(
        &self,
        expected: &[S],
        config: &AuditConfig,
    ) -> Result<Vec<String>> {
        let expected = ExpectedApprovals::new(expected);
        let mut discovered = Vec::new();
        for dir in &expected.directories {
            discovered.extend(self.lister.list(dir, &config.approved_file_pattern)?);
        }
        debug!(
            expected = expected.files.len(),
            directories = expected.directories.len(),
            discovered = discovered.len(),
            "scanned approved directories"
        );
        Ok(stale_paths(&expected, discovered, |p| config.ignores(p)))
    }

    /// Fail when stale baselines exist. A no-op unless the config enables it.
    pub fn audit<S: AsRef<str>>(&self, expected: &[S], config: &AuditConfig) -> Result<()> {
        if !config.error_on_stale_approved_files {
            return Ok(());
        }
        let stale = self.find_stale_approvals(expected, config)?;
        if stale.is_empty() {
            return Ok(());
        }
        warn!(count = stale.len(), "stale approved files found");
        bail!("{}", stale_message(&stale));
    }
}

/// Audit against the filesystem.
pub fn audit<S: AsRef<str>>(expected: &[S], config: &AuditConfig) -> Result<()> {
    StaleApprovalAuditor::default().audit(expected, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeLister;
    use std::fs;

    fn disabled() -> AuditConfig {
        AuditConfig {
            error_on_stale_approved_files: false,
            ..AuditConfig::enabled().expect("config")
        }
    }

    #[test]
    fn disabled_audit_never_fails() {
        let lister = FakeLister::default().with_dir("a", &["a/x.approved.txt", "a/y.approved.txt"]);
        let auditor = StaleApprovalAuditor::new(lister);
        auditor
            .audit(&["a/x.approved.txt"], &disabled())
            .expect("disabled audit");
        assert!(auditor.lister.scanned().is_empty());
    }

    #[test]
    fn unexpected_baseline_fails_the_run() {
        let lister = FakeLister::default().with_dir("a", &["a/x.approved.txt", "a/y.approved.txt"]);
        let auditor = StaleApprovalAuditor::new(lister);
        let err = auditor
            .audit(&["a/x.approved.txt"], &AuditConfig::enabled().expect("config"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "ERROR: Found stale approvals files: \n  - a/y.approved.txt\n"
        );
    }

    #[test]
    fn ignored_baseline_passes() {
        let lister = FakeLister::default().with_dir("a", &["a/x.approved.txt", "a/y.approved.txt"]);
        let auditor = StaleApprovalAuditor::new(lister);
        let config = AuditConfig::enabled()
            .expect("config")
            .with_ignore(|p| p == "a/y.approved.txt");
        auditor
            .audit(&["a/x.approved.txt"], &config)
            .expect("ignored stale file");
    }

    #[test]
    fn each_directory_is_scanned_once() {
        let lister = FakeLister::default()
            .with_dir("a", &["a/x.approved.txt", "a/b/z.approved.txt"])
            .with_dir("a/b", &["a/b/z.approved.txt"]);
        let auditor = StaleApprovalAuditor::new(lister);
        let stale = auditor
            .find_stale_approvals(
                &["a/x.approved.txt", r"a\x.approved.txt", "a/b/w.approved.txt"],
                &AuditConfig::enabled().expect("config"),
            )
            .expect("find");
        assert_eq!(stale, vec!["a/b/z.approved.txt"]);
        assert_eq!(auditor.lister.scanned(), vec!["a", "a/b"]);
    }

    #[test]
    fn windows_separators_match_discovered_paths() {
        let lister = FakeLister::default().with_dir("a/b", &[r"a\b\x.approved.txt"]);
        let auditor = StaleApprovalAuditor::new(lister);
        auditor
            .audit(&[r"a\b\x.approved.txt"], &AuditConfig::enabled().expect("config"))
            .expect("no stale files");
    }

    #[test]
    fn filesystem_audit_finds_renamed_test_baseline() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dir = temp.path().join("tests");
        fs::create_dir_all(dir.join("nested")).expect("mkdir");
        fs::write(dir.join("kept.approved.txt"), "ok").expect("write");
        fs::write(dir.join("kept.received.txt"), "ok").expect("write");
        fs::write(dir.join("nested/old_name.approved.txt"), "old").expect("write");

        let kept = dir.join("kept.approved.txt").to_string_lossy().into_owned();
        let err = audit(&[kept.clone()], &AuditConfig::enabled().expect("config")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("nested/old_name.approved.txt"));
        assert!(!msg.contains("kept.approved.txt"));
        assert!(!msg.contains("kept.received.txt"));
    }

    #[test]
    fn config_ignore_globs_exempt_paths() {
        let cfg = ApprovalsConfig {
            error_on_stale_approved_files: true,
            stale_ignore: vec!["**/shared/*".to_string()],
            ..ApprovalsConfig::default()
        };
        let config = AuditConfig::from_config(&cfg).expect("config");
        let lister =
            FakeLister::default().with_dir("a", &["a/x.approved.txt", "a/shared/s.approved.txt"]);
        StaleApprovalAuditor::new(lister)
            .audit(&["a/x.approved.txt"], &config)
            .expect("shared baseline ignored");
    }
}
