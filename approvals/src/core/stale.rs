//! Set difference between discovered and expected baseline files.

use std::collections::BTreeSet;

use crate::core::path::{normalize_path, parent_dir};

const STALE_BANNER: &str = "ERROR: Found stale approvals files: \n  - ";

/// Normalized expected paths and the distinct directories that contain them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedApprovals {
    pub files: BTreeSet<String>,
    pub directories: BTreeSet<String>,
}

impl ExpectedApprovals {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let files: BTreeSet<String> = paths
            .into_iter()
            .map(|p| normalize_path(p.as_ref()))
            .collect();
        let directories = files.iter().map(|f| parent_dir(f).to_string()).collect();
        Self { files, directories }
    }
}

/// Discovered paths not present in `expected`, skipping any the predicate ignores.
///
/// Discovered paths are normalized and deduplicated; the result is sorted.
pub fn stale_paths<I, S, F>(expected: &ExpectedApprovals, discovered: I, ignore: F) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: Fn(&str) -> bool,
{
    let discovered: BTreeSet<String> = discovered
        .into_iter()
        .map(|p| normalize_path(p.as_ref()))
        .collect();
    discovered
        .into_iter()
        .filter(|path| !ignore(path))
        .filter(|path| !expected.files.contains(path))
        .collect()
}

/// Error text listing every stale path, one per line.
pub fn stale_message(stale: &[String]) -> String {
    format!("{STALE_BANNER}{}\n", stale.join("\n  - "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_collects_distinct_directories() {
        let expected = ExpectedApprovals::new([
            "a/x.approved.txt",
            r"a\y.approved.txt",
            "b/c/z.approved.txt",
            "top.approved.txt",
        ]);
        let dirs: Vec<&str> = expected.directories.iter().map(String::as_str).collect();
        assert_eq!(dirs, vec![".", "a", "b/c"]);
        assert!(expected.files.contains("a/y.approved.txt"));
    }

    #[test]
    fn unexpected_file_is_stale() {
        let expected = ExpectedApprovals::new(["a/x.approved.txt"]);
        let stale = stale_paths(
            &expected,
            ["a/x.approved.txt", "a/y.approved.txt"],
            |_| false,
        );
        assert_eq!(stale, vec!["a/y.approved.txt"]);
    }

    #[test]
    fn ignored_file_is_not_stale() {
        let expected = ExpectedApprovals::new(["a/x.approved.txt"]);
        let stale = stale_paths(
            &expected,
            ["a/x.approved.txt", "a/y.approved.txt"],
            |p| p == "a/y.approved.txt",
        );
        assert!(stale.is_empty());
    }

    #[test]
    fn separator_style_does_not_create_stale_entries() {
        let expected = ExpectedApprovals::new([r"a\x.approved.txt"]);
        let stale = stale_paths(&expected, ["a/x.approved.txt", r"a\x.approved.txt"], |_| {
            false
        });
        assert!(stale.is_empty());
    }

    #[test]
    fn message_lists_each_path_on_its_own_line() {
        let msg = stale_message(&["a/y.approved.txt".to_string(), "b/z.approved.txt".to_string()]);
        assert_eq!(
            msg,
            "ERROR: Found stale approvals files: \n  - a/y.approved.txt\n  - b/z.approved.txt\n"
        );
    }
}
