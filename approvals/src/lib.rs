//! Reporter launching and stale-baseline auditing for approval tests.
//!
//! When a test's received output differs from its approved baseline, a
//! [`reporter::Reporter`] names an external diff program and the
//! [`reporter::ReporterGate`] decides whether and how to start it. The
//! [`audit`] module independently fails a run that leaves unreferenced
//! baseline files behind.
//!
//! - **[`core`]**: Pure, deterministic logic (path normalization, argument
//!   resolution, stale-set computation). No I/O.
//! - **[`io`]**: Side-effecting operations (filesystem probes, process
//!   spawning, directory scans, config). Behind traits where tests substitute
//!   fakes.

pub mod audit;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod launch;
pub mod logging;
pub mod reporter;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
