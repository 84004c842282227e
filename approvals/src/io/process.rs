//! Helpers for running reporter processes and capturing their output in full.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument};

use crate::core::types::ProcessOptions;

/// Executable, ordered arguments, and pass-through options for one launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub exe: PathBuf,
    pub args: Vec<String>,
    pub options: ProcessOptions,
}

impl CommandSpec {
    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.exe);
        cmd.args(&self.args);
        if let Some(dir) = &self.options.current_dir {
            cmd.current_dir(dir);
        }
        cmd.envs(&self.options.env);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

/// Captured child process output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Exit code, when the child ran and exited normally.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    /// Represent a launch that never started. The failure is only visible as stderr text.
    pub fn spawn_failure(spec: &CommandSpec, err: &std::io::Error) -> Self {
        Self {
            exit_code: None,
            stdout: String::new(),
            stderr: format!("failed to spawn {}: {err}", spec.exe.display()),
        }
    }
}

/// Invoked once with the complete output after a detached child exits.
pub type ExitCallback = Box<dyn FnOnce(CapturedOutput) + Send + 'static>;

/// Handle to a detached launch.
#[derive(Debug)]
pub struct LaunchHandle {
    supervisor: Option<thread::JoinHandle<()>>,
}

impl LaunchHandle {
    /// A handle whose work has already finished.
    pub fn finished() -> Self {
        Self { supervisor: None }
    }

    pub fn from_thread(supervisor: thread::JoinHandle<()>) -> Self {
        Self {
            supervisor: Some(supervisor),
        }
    }

    /// Block until the child has exited and its output has been flushed.
    pub fn wait(self) -> Result<()> {
        match self.supervisor {
            Some(handle) => handle
                .join()
                .map_err(|_| anyhow!("reporter supervisor thread panicked")),
            None => Ok(()),
        }
    }
}

/// Process-spawn primitive with a blocking and an event-driven entry point.
pub trait ProcessSpawner: Send + Sync {
    /// Run to completion and return buffered output.
    fn run_blocking(&self, spec: &CommandSpec) -> CapturedOutput;

    /// Start the process and return immediately; `on_exit` receives the
    /// accumulated output once the process terminates.
    fn run_detached(&self, spec: &CommandSpec, on_exit: ExitCallback) -> LaunchHandle;
}

/// Spawner backed by `std::process::Command`.
pub struct SystemSpawner;

impl ProcessSpawner for SystemSpawner {
    #[instrument(skip_all, fields(exe = %spec.exe.display()))]
    fn run_blocking(&self, spec: &CommandSpec) -> CapturedOutput {
        debug!("spawning reporter");
        match spec.command().spawn() {
            Ok(child) => collect_output(child).unwrap_or_else(|e| {
                error!(err = %e, "failed to collect reporter output");
                CapturedOutput {
                    stderr: format!("{e:#}"),
                    ..CapturedOutput::default()
                }
            }),
            Err(e) => {
                error!(err = %e, "failed to spawn reporter");
                CapturedOutput::spawn_failure(spec, &e)
            }
        }
    }

    #[instrument(skip_all, fields(exe = %spec.exe.display()))]
    fn run_detached(&self, spec: &CommandSpec, on_exit: ExitCallback) -> LaunchHandle {
        debug!("spawning detached reporter");
        let child = match spec.command().spawn() {
            Ok(child) => child,
            Err(e) => {
                error!(err = %e, "failed to spawn reporter");
                on_exit(CapturedOutput::spawn_failure(spec, &e));
                return LaunchHandle::finished();
            }
        };
        LaunchHandle::from_thread(thread::spawn(move || {
            let output = collect_output(child).unwrap_or_else(|e| {
                error!(err = %e, "failed to collect reporter output");
                CapturedOutput {
                    stderr: format!("{e:#}"),
                    ..CapturedOutput::default()
                }
            });
            on_exit(output);
        }))
    }
}

/// Drain stdout and stderr concurrently until the child exits.
fn collect_output(mut child: Child) -> Result<CapturedOutput> {
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;

    let stdout_handle = thread::spawn(move || read_stream(stdout));
    let stderr_handle = thread::spawn(move || read_stream(stderr));

    let status = child.wait().context("wait for reporter")?;

    let stdout = join_output(stdout_handle).context("join stdout")?;
    let stderr = join_output(stderr_handle).context("join stderr")?;

    debug!(exit_code = ?status.code(), "reporter finished");
    Ok(CapturedOutput {
        exit_code: status.code(),
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
    })
}

fn join_output(handle: thread::JoinHandle<Result<Vec<u8>>>) -> Result<Vec<u8>> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(anyhow!("output reader thread panicked")),
    }
}

/// Accumulate chunks until end of stream.
fn read_stream<R: Read>(mut reader: R) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];

    loop {
        let n = reader.read(&mut chunk).context("read output")?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Ok(buf)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn sh(script: &str) -> CommandSpec {
        CommandSpec {
            exe: PathBuf::from("/bin/sh"),
            args: vec!["-c".to_string(), script.to_string()],
            options: ProcessOptions::default(),
        }
    }

    #[test]
    fn blocking_run_captures_both_streams() {
        let output = SystemSpawner.run_blocking(&sh("printf out; printf err >&2; exit 3"));
        assert_eq!(output.stdout, "out");
        assert_eq!(output.stderr, "err");
        assert_eq!(output.exit_code, Some(3));
    }

    #[test]
    fn missing_executable_becomes_stderr_text() {
        let spec = CommandSpec {
            exe: PathBuf::from("/definitely/not/a/reporter"),
            args: Vec::new(),
            options: ProcessOptions::default(),
        };
        let output = SystemSpawner.run_blocking(&spec);
        assert_eq!(output.exit_code, None);
        assert!(output.stderr.contains("failed to spawn /definitely/not/a/reporter"));
    }

    #[test]
    fn detached_run_delivers_output_on_exit() {
        let (tx, rx) = mpsc::channel();
        let handle = SystemSpawner.run_detached(
            &sh("printf 'line1\\n'; sleep 0.1; printf 'line2\\n'"),
            Box::new(move |output| {
                tx.send(output).expect("send");
            }),
        );
        handle.wait().expect("wait");
        let output = rx.recv().expect("output");
        assert_eq!(output.stdout, "line1\nline2\n");
        assert!(output.stderr.is_empty());
    }

    #[test]
    fn options_forward_cwd_and_env() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut spec = sh("printf \"$REPORTER_FLAG:\"; pwd");
        spec.options.current_dir = Some(temp.path().to_path_buf());
        spec.options
            .env
            .insert("REPORTER_FLAG".to_string(), "on".to_string());
        let output = SystemSpawner.run_blocking(&spec);
        let canonical = temp.path().canonicalize().expect("canonicalize");
        assert!(output.stdout.starts_with("on:"));
        assert!(output.stdout.trim_end().ends_with(
            canonical
                .file_name()
                .and_then(|n| n.to_str())
                .expect("dir name")
        ));
    }
}
