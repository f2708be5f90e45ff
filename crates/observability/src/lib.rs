//! Tracing/logging setup shared by every binary and test harness.

/// Initialize process-wide logging from the environment.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Environment-driven logging configuration.
pub mod config;

/// Subscriber installation (filters, output format).
pub mod tracing;

pub use config::{LogConfig, LogFormat};
