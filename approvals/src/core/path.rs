//! Helpers for comparing baseline paths independent of separator style.

/// Rewrite every `\` separator as `/`.
///
/// Idempotent: normalizing an already-normalized path returns it unchanged.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Return the parent directory of a normalized path.
///
/// A bare file name has parent `.`, matching how a directory scan rooted at the
/// current directory reports its entries.
pub fn parent_dir(normalized: &str) -> &str {
    match normalized.rfind('/') {
        Some(0) => "/",
        Some(idx) => &normalized[..idx],
        None => ".",
    }
}

/// Join a scan root and a `/`-separated relative path the way expected paths
/// are spelled, so `.` contributes no prefix.
pub fn join_under(dir: &str, relative: &str) -> String {
    match dir {
        "." | "" => relative.to_string(),
        d if d.ends_with('/') => format!("{d}{relative}"),
        d => format!("{d}/{relative}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_converts_backslashes() {
        assert_eq!(normalize_path(r"a\b\x.approved.txt"), "a/b/x.approved.txt");
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize_path(r"dir\sub/x.approved.txt");
        assert_eq!(normalize_path(&once), once);
    }

    #[test]
    fn separator_styles_normalize_equal() {
        assert_eq!(
            normalize_path(r"a\x.approved.txt"),
            normalize_path("a/x.approved.txt")
        );
    }

    #[test]
    fn parent_dir_handles_bare_and_rooted_names() {
        assert_eq!(parent_dir("x.approved.txt"), ".");
        assert_eq!(parent_dir("/x.approved.txt"), "/");
        assert_eq!(parent_dir("a/b/x.approved.txt"), "a/b");
    }

    #[test]
    fn join_under_skips_current_dir_prefix() {
        assert_eq!(join_under(".", "x.approved.txt"), "x.approved.txt");
        assert_eq!(join_under("a", "b/x.approved.txt"), "a/b/x.approved.txt");
        assert_eq!(join_under("/", "x.approved.txt"), "/x.approved.txt");
    }
}
