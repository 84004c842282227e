//! Destinations for consolidated child-process output.

use std::io::Write;
use std::sync::{Arc, Mutex};

use tracing::warn;

/// Receives fully formed output blocks. Blocks are never partial.
pub trait OutputSink: Send + Sync {
    fn emit(&self, block: &str);
}

/// Prints blocks to the process's stdout.
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&self, block: &str) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = out.write_all(block.as_bytes()).and_then(|()| out.flush()) {
            warn!(err = %e, "failed to write reporter output");
        }
    }
}

/// Collects blocks in memory, e.g. for embedding callers that render output themselves.
#[derive(Clone, Default)]
pub struct BufferSink {
    blocks: Arc<Mutex<Vec<String>>>,
}

impl BufferSink {
    pub fn blocks(&self) -> Vec<String> {
        match self.blocks.lock() {
            Ok(blocks) => blocks.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl OutputSink for BufferSink {
    fn emit(&self, block: &str) {
        match self.blocks.lock() {
            Ok(mut blocks) => blocks.push(block.to_string()),
            Err(poisoned) => poisoned.into_inner().push(block.to_string()),
        }
    }
}
