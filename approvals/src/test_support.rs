//! Test-only fakes for the spawn, limiter, and listing seams.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use anyhow::Result;
use glob::Pattern;

use crate::core::types::ProcessOptions;
use crate::io::discovery::ApprovedFileLister;
use crate::io::limiter::LaunchLimiter;
use crate::io::process::{CapturedOutput, CommandSpec, ExitCallback, LaunchHandle, ProcessSpawner};

/// Create an empty file standing in for a reporter executable.
pub fn fake_exe(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, "").expect("write fake exe");
    path
}

/// One recorded spawn.
#[derive(Debug, Clone)]
pub struct SpawnCall {
    pub spec: CommandSpec,
    pub blocking: bool,
    /// Whether each argument named an existing path at spawn time.
    pub args_existing: Vec<bool>,
}

/// Spawner that records calls and returns a scripted output.
#[derive(Default)]
pub struct RecordingSpawner {
    output: CapturedOutput,
    calls: Mutex<Vec<SpawnCall>>,
}

impl RecordingSpawner {
    pub fn with_output(output: CapturedOutput) -> Self {
        Self {
            output,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<SpawnCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, spec: &CommandSpec, blocking: bool) {
        let args_existing = spec.args.iter().map(|a| Path::new(a).exists()).collect();
        self.calls.lock().expect("calls lock").push(SpawnCall {
            spec: spec.clone(),
            blocking,
            args_existing,
        });
    }
}

impl ProcessSpawner for RecordingSpawner {
    fn run_blocking(&self, spec: &CommandSpec) -> CapturedOutput {
        self.record(spec, true);
        self.output.clone()
    }

    fn run_detached(&self, spec: &CommandSpec, on_exit: ExitCallback) -> LaunchHandle {
        self.record(spec, false);
        let output = self.output.clone();
        LaunchHandle::from_thread(thread::spawn(move || on_exit(output)))
    }
}

/// Limiter returning a fixed answer and counting queries.
pub struct ScriptedLimiter {
    suppress: bool,
    calls: AtomicUsize,
}

impl ScriptedLimiter {
    pub fn new(suppress: bool) -> Self {
        Self {
            suppress,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LaunchLimiter for ScriptedLimiter {
    fn check(&self, _approved: &Path, _received: &Path, _options: &ProcessOptions) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.suppress
    }
}

/// Lister returning fixed paths per directory, ignoring the pattern.
#[derive(Default)]
pub struct FakeLister {
    entries: Vec<(String, Vec<String>)>,
    scanned: Mutex<Vec<String>>,
}

impl FakeLister {
    pub fn with_dir(mut self, dir: &str, files: &[&str]) -> Self {
        self.entries.push((
            dir.to_string(),
            files.iter().map(|f| f.to_string()).collect(),
        ));
        self
    }

    /// Directories scanned, in call order.
    pub fn scanned(&self) -> Vec<String> {
        self.scanned.lock().expect("scanned lock").clone()
    }
}

impl ApprovedFileLister for FakeLister {
    fn list(&self, dir: &str, _pattern: &Pattern) -> Result<Vec<String>> {
        self.scanned
            .lock()
            .expect("scanned lock")
            .push(dir.to_string());
        Ok(self
            .entries
            .iter()
            .filter(|(d, _)| d == dir)
            .flat_map(|(_, files)| files.iter().cloned())
            .collect())
    }
}
