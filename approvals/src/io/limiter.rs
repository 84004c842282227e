//! Rate limiting for detached reporter launches.

use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use tracing::warn;

use crate::core::types::ProcessOptions;

/// Decides whether a detached launch should be suppressed.
///
/// Implementations serialize their own bookkeeping; callers treat `check` as
/// an opaque synchronous query.
pub trait LaunchLimiter: Send + Sync {
    /// `true` suppresses the launch.
    fn check(&self, approved: &Path, received: &Path, options: &ProcessOptions) -> bool;
}

/// Limiter that never suppresses.
pub struct NeverSuppress;

impl LaunchLimiter for NeverSuppress {
    fn check(&self, _approved: &Path, _received: &Path, _options: &ProcessOptions) -> bool {
        false
    }
}

/// Allows a fixed number of launches per process, then suppresses the rest.
#[derive(Debug)]
pub struct LaunchCircuitBreaker {
    max_launches: u32,
    checked: AtomicU32,
}

impl LaunchCircuitBreaker {
    pub fn new(max_launches: u32) -> Self {
        Self {
            max_launches,
            checked: AtomicU32::new(0),
        }
    }

    pub fn launches(&self) -> u32 {
        self.checked.load(Ordering::SeqCst).min(self.max_launches)
    }
}

impl LaunchLimiter for LaunchCircuitBreaker {
    fn check(&self, approved: &Path, received: &Path, _options: &ProcessOptions) -> bool {
        let previous = self.checked.fetch_add(1, Ordering::SeqCst);
        if previous < self.max_launches {
            return false;
        }
        if previous == self.max_launches {
            warn!(
                max_launches = self.max_launches,
                approved = %approved.display(),
                received = %received.display(),
                "reporter launch limit reached, suppressing further launches"
            );
        }
        true
    }
}
