//! I/O helpers for reporter dispatch and approval audits.

pub mod config;
pub mod discovery;
pub mod fs;
pub mod limiter;
pub mod process;
pub mod sink;
