//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

use log::LevelFilter;

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Initialize logging with a default level filter
///
/// `RUST_LOG` still overrides the level for individual modules. Calling this
/// more than once is harmless; later calls are ignored.
pub fn init_with_level(level: LevelFilter) {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();
}

/// Parse a textual level such as `"info"` or `"debug"`
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    level.trim().parse().ok()
}

/// Route log output through the test harness capture
#[cfg(test)]
pub(crate) fn init_for_tests() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Debug)
        .is_test(true)
        .try_init();
}
