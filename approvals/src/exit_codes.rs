//! Stable exit codes for the `approvals` CLI.

/// Command succeeded, or the reporter can handle the file.
pub const OK: i32 = 0;
/// Command failed: invalid config, contract violation, or stale approvals.
pub const FAILURE: i32 = 1;
/// The named reporter is not configured, not installed, or cannot handle the file.
pub const UNAVAILABLE: i32 = 2;
