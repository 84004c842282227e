//! Memoized reporter availability.

use std::cell::Cell;

/// Outcome of the one-time executable lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Unknown,
    Found,
    NotFound,
}

/// Single-threaded cache around the executable lookup.
///
/// Resolved at most once per instance and never reset, even if the
/// filesystem changes afterwards.
#[derive(Debug)]
pub struct AvailabilityCache {
    state: Cell<Availability>,
}

impl Default for AvailabilityCache {
    fn default() -> Self {
        Self {
            state: Cell::new(Availability::Unknown),
        }
    }
}

impl AvailabilityCache {
    pub fn state(&self) -> Availability {
        self.state.get()
    }

    /// Return the cached answer, running `probe` only while the state is unknown.
    pub fn resolve<F: FnOnce() -> bool>(&self, probe: F) -> bool {
        match self.state.get() {
            Availability::Found => true,
            Availability::NotFound => false,
            Availability::Unknown => {
                let found = probe();
                self.state.set(if found {
                    Availability::Found
                } else {
                    Availability::NotFound
                });
                found
            }
        }
    }
}
