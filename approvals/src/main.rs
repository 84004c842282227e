//! Approval-test reporter launcher.
//!
//! Starts configured diff programs on approved/received file pairs and audits
//! baseline directories for stale approved files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::debug;

use approvals::audit::{AuditConfig, StaleApprovalAuditor};
use approvals::core::types::{LaunchRequest, expand_arg_template};
use approvals::exit_codes;
use approvals::io::config::{ApprovalsConfig, CONFIG_PATH, load_config, write_config};
use approvals::launch::LaunchOutcome;
use approvals::logging;
use approvals::reporter::{Reporter, ReporterGate};

#[derive(Parser)]
#[command(
    name = "approvals",
    version,
    about = "Launch diff reporters and audit approved baselines"
)]
struct Cli {
    /// Path to the TOML config.
    #[arg(long, global = true, default_value = CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default config file.
    Init {
        /// Overwrite an existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Exit 0 when the reporter can show a diff for FILE, 2 otherwise.
    CanReport {
        #[arg(long)]
        reporter: String,
        file: PathBuf,
    },
    /// Launch a reporter on an approved/received pair.
    Report {
        #[arg(long)]
        reporter: String,
        /// Wait for the reporter to exit (bypasses the launch limit).
        #[arg(long)]
        block: bool,
        approved: PathBuf,
        received: PathBuf,
    },
    /// Fail when approved files exist that none of the expected paths name.
    Audit {
        /// Run even if the config leaves the stale check disabled.
        #[arg(long)]
        enable: bool,
        /// File listing expected approved paths, one per line.
        #[arg(long)]
        list: Option<PathBuf>,
        expected: Vec<String>,
    },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::FAILURE);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Init { force } => cmd_init(&cli.config, force),
        Command::CanReport { reporter, file } => {
            let cfg = load_config(&cli.config)?;
            cmd_can_report(&cfg, &reporter, &file)
        }
        Command::Report {
            reporter,
            block,
            approved,
            received,
        } => {
            let cfg = load_config(&cli.config)?;
            cmd_report(&cfg, &reporter, block, approved, received)
        }
        Command::Audit {
            enable,
            list,
            expected,
        } => {
            let cfg = load_config(&cli.config)?;
            cmd_audit(&cfg, enable, list.as_deref(), expected)
        }
    }
}

fn cmd_init(path: &Path, force: bool) -> Result<i32> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    write_config(path, &ApprovalsConfig::default())?;
    Ok(exit_codes::OK)
}

fn cmd_can_report(cfg: &ApprovalsConfig, name: &str, file: &Path) -> Result<i32> {
    let Some(reporter_cfg) = cfg.reporter(name) else {
        eprintln!("unknown reporter {name:?}");
        return Ok(exit_codes::UNAVAILABLE);
    };
    let reporter = Reporter::from_config(reporter_cfg)?;
    let can_report = reporter.can_report_on(file)?;
    println!("{can_report}");
    Ok(if can_report {
        exit_codes::OK
    } else {
        exit_codes::UNAVAILABLE
    })
}

fn cmd_report(
    cfg: &ApprovalsConfig,
    name: &str,
    block: bool,
    approved: PathBuf,
    received: PathBuf,
) -> Result<i32> {
    let Some(reporter_cfg) = cfg.reporter(name) else {
        eprintln!("unknown reporter {name:?}");
        return Ok(exit_codes::UNAVAILABLE);
    };
    let reporter = Reporter::from_config(reporter_cfg)?;
    if !reporter.is_available() {
        eprintln!("reporter {name:?} is not installed");
        return Ok(exit_codes::UNAVAILABLE);
    }

    let mut request = LaunchRequest::new(approved, received)
        .blocking(block || cfg.block_until_reporter_exits);
    if !reporter_cfg.args.is_empty() {
        let args = expand_arg_template(
            &reporter_cfg.args,
            &request.approved_path.display().to_string(),
            &request.received_path.display().to_string(),
        );
        request = request.with_args(args);
    }

    let gate = ReporterGate::system(cfg.max_launches);
    match gate.dispatch(&reporter, &request)? {
        LaunchOutcome::Suppressed => debug!("launch suppressed"),
        LaunchOutcome::Completed(output) => debug!(exit_code = ?output.exit_code, "reporter exited"),
        // Keep the process alive until the detached reporter's output is flushed.
        LaunchOutcome::Detached(handle) => handle.wait()?,
    }
    Ok(exit_codes::OK)
}

fn cmd_audit(
    cfg: &ApprovalsConfig,
    enable: bool,
    list: Option<&Path>,
    mut expected: Vec<String>,
) -> Result<i32> {
    if let Some(list) = list {
        let contents =
            fs::read_to_string(list).with_context(|| format!("read {}", list.display()))?;
        expected.extend(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string),
        );
    }
    let mut config = AuditConfig::from_config(cfg)?;
    config.error_on_stale_approved_files |= enable;
    StaleApprovalAuditor::default().audit(expected.as_slice(), &config)?;
    Ok(exit_codes::OK)
}
