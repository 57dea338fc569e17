//! Logging utilities
//!
//! The engine logs through the `log` facade; binaries pick the backend.

pub use log::{debug, error, info, trace, warn};

/// Initialize env_logger from `RUST_LOG`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    let _ = env_logger::try_init();
}

/// Initialize env_logger with `filter` as the default when `RUST_LOG` is unset.
pub fn init_with_filter(filter: &str) {
    let env = env_logger::Env::default().default_filter_or(filter);
    let _ = env_logger::Builder::from_env(env).try_init();
}
