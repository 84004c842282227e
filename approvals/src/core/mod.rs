//! Deterministic, pure logic shared by the reporter gate and the auditor.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data and return deterministic outputs suitable for tests.

pub mod availability;
pub mod output;
pub mod path;
pub mod stale;
pub mod types;
