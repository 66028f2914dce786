//! Shared helpers for logging, progress and console output.

pub mod logging;
