//! Shared deterministic types for reporter dispatch.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Process configuration forwarded to the spawn primitive unmodified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Working directory for the child process. Inherits the caller's when `None`.
    pub current_dir: Option<PathBuf>,
    /// Extra environment variables layered over the inherited environment.
    pub env: BTreeMap<String, String>,
}

/// One decision-to-launch event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    /// Baseline file. Created empty before launch if missing.
    pub approved_path: PathBuf,
    /// Freshly produced output.
    pub received_path: PathBuf,
    /// Wait for the reporter to exit instead of launching it detached.
    pub block_until_exit: bool,
    /// Replaces the default `[received, approved]` argument list.
    pub argument_override: Option<Vec<String>>,
    pub process_options: ProcessOptions,
}

impl LaunchRequest {
    pub fn new(approved_path: impl Into<PathBuf>, received_path: impl Into<PathBuf>) -> Self {
        Self {
            approved_path: approved_path.into(),
            received_path: received_path.into(),
            block_until_exit: false,
            argument_override: None,
            process_options: ProcessOptions::default(),
        }
    }

    pub fn blocking(mut self, block_until_exit: bool) -> Self {
        self.block_until_exit = block_until_exit;
        self
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.argument_override = Some(args);
        self
    }

    pub fn with_options(mut self, options: ProcessOptions) -> Self {
        self.process_options = options;
        self
    }

    /// Arguments handed to the reporter executable.
    ///
    /// Defaults to received-then-approved. Viewers expecting another order
    /// must be configured with an explicit override.
    pub fn args(&self) -> Vec<String> {
        match &self.argument_override {
            Some(args) => args.clone(),
            None => vec![
                self.received_path.display().to_string(),
                self.approved_path.display().to_string(),
            ],
        }
    }
}

/// Expand `{received}` and `{approved}` placeholders in a configured
/// argument template.
pub fn expand_arg_template(template: &[String], approved: &str, received: &str) -> Vec<String> {
    template
        .iter()
        .map(|arg| {
            arg.replace("{received}", received)
                .replace("{approved}", approved)
        })
        .collect()
}
