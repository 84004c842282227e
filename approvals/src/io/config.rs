//! Approvals configuration stored under `.approvals/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::io::discovery::{DEFAULT_APPROVED_PATTERN, compile_pattern};

/// Default location of the config file, relative to the project root.
pub const CONFIG_PATH: &str = ".approvals/config.toml";

/// Approvals configuration (TOML).
///
/// Edited by humans. Missing fields take defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApprovalsConfig {
    /// Fail the run when baseline files exist that no test referenced.
    pub error_on_stale_approved_files: bool,

    /// File-name glob identifying baseline files during the stale scan.
    pub approved_file_pattern: String,

    /// Globs for discovered paths exempt from the stale check.
    pub stale_ignore: Vec<String>,

    /// Detached reporter launches allowed per process.
    pub max_launches: u32,

    /// Wait for the reporter to exit by default.
    pub block_until_reporter_exits: bool,

    pub reporters: Vec<ReporterConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReporterConfig {
    pub name: String,

    /// Absolute path of the diff program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exe: Option<PathBuf>,

    #[serde(default)]
    pub image_capable: bool,

    /// Argument template; `{received}` and `{approved}` are substituted.
    /// Empty means the default received-then-approved order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl Default for ApprovalsConfig {
    fn default() -> Self {
        Self {
            error_on_stale_approved_files: false,
            approved_file_pattern: DEFAULT_APPROVED_PATTERN.to_string(),
            stale_ignore: Vec::new(),
            max_launches: 10,
            block_until_reporter_exits: false,
            reporters: Vec::new(),
        }
    }
}

impl ApprovalsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_launches == 0 {
            return Err(anyhow!("max_launches must be > 0"));
        }
        if self.approved_file_pattern.trim().is_empty() {
            return Err(anyhow!("approved_file_pattern must be non-empty"));
        }
        compile_pattern(&self.approved_file_pattern)?;
        self.stale_ignore_patterns()?;
        for (idx, reporter) in self.reporters.iter().enumerate() {
            if reporter.name.trim().is_empty() {
                return Err(anyhow!("reporters[{idx}].name must be non-empty"));
            }
            if self.reporters[..idx]
                .iter()
                .any(|other| other.name == reporter.name)
            {
                return Err(anyhow!("duplicate reporter name {:?}", reporter.name));
            }
        }
        Ok(())
    }

    pub fn stale_ignore_patterns(&self) -> Result<Vec<Pattern>> {
        self.stale_ignore
            .iter()
            .map(|p| compile_pattern(p))
            .collect()
    }

    pub fn reporter(&self, name: &str) -> Option<&ReporterConfig> {
        self.reporters.iter().find(|r| r.name == name)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ApprovalsConfig::default()`.
pub fn load_config(path: &Path) -> Result<ApprovalsConfig> {
    if !path.exists() {
        let cfg = ApprovalsConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ApprovalsConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &ApprovalsConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
