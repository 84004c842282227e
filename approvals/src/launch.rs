//! Launch strategies sharing one output-reporting tail.
//!
//! [`BlockingLaunch`] waits for the reporter and reports its output before
//! returning. [`DetachedLaunch`] returns immediately and reports once the
//! child exits. Both hand the captured output to [`emit_output`].

use std::sync::Arc;

use crate::core::output::format_block;
use crate::io::process::{CapturedOutput, CommandSpec, LaunchHandle, ProcessSpawner};
use crate::io::sink::OutputSink;

/// Result of a dispatch.
#[derive(Debug)]
pub enum LaunchOutcome {
    /// The limiter vetoed a detached launch; nothing was started.
    Suppressed,
    /// A blocking launch ran to completion.
    Completed(CapturedOutput),
    /// A detached launch is running; its output is reported on exit.
    Detached(LaunchHandle),
}

impl LaunchOutcome {
    pub fn is_suppressed(&self) -> bool {
        matches!(self, LaunchOutcome::Suppressed)
    }
}

/// Runs a command and yields its combined output once finished.
pub trait LaunchStrategy {
    fn launch(
        &self,
        spawner: &dyn ProcessSpawner,
        spec: &CommandSpec,
        sink: Arc<dyn OutputSink>,
    ) -> LaunchOutcome;
}

pub struct BlockingLaunch;

impl LaunchStrategy for BlockingLaunch {
    fn launch(
        &self,
        spawner: &dyn ProcessSpawner,
        spec: &CommandSpec,
        sink: Arc<dyn OutputSink>,
    ) -> LaunchOutcome {
        let output = spawner.run_blocking(spec);
        emit_output(sink.as_ref(), &output);
        LaunchOutcome::Completed(output)
    }
}

pub struct DetachedLaunch;

impl LaunchStrategy for DetachedLaunch {
    fn launch(
        &self,
        spawner: &dyn ProcessSpawner,
        spec: &CommandSpec,
        sink: Arc<dyn OutputSink>,
    ) -> LaunchOutcome {
        let handle = spawner.run_detached(
            spec,
            Box::new(move |output| emit_output(sink.as_ref(), &output)),
        );
        LaunchOutcome::Detached(handle)
    }
}

/// Pick the strategy for a request.
pub fn strategy_for(block_until_exit: bool) -> &'static dyn LaunchStrategy {
    if block_until_exit {
        &BlockingLaunch
    } else {
        &DetachedLaunch
    }
}

/// Emit stdout then stderr, each as one block, skipping empty streams.
pub fn emit_output(sink: &dyn OutputSink, output: &CapturedOutput) {
    if let Some(block) = format_block("stdout", &output.stdout) {
        sink.emit(&block);
    }
    if let Some(block) = format_block("stderr", &output.stderr) {
        sink.emit(&block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::sink::BufferSink;

    #[test]
    fn empty_streams_emit_nothing() {
        let sink = BufferSink::default();
        emit_output(&sink, &CapturedOutput::default());
        assert!(sink.blocks().is_empty());
    }

    #[test]
    fn streams_emit_in_order() {
        let sink = BufferSink::default();
        let output = CapturedOutput {
            exit_code: Some(1),
            stdout: "out".to_string(),
            stderr: "err".to_string(),
        };
        emit_output(&sink, &output);
        let blocks = sink.blocks();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].contains("stdout:\n============\nout\n"));
        assert!(blocks[1].contains("stderr:\n============\nerr\n"));
    }
}
