//! Logging bootstrap based on `tracing-subscriber`.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,enqueuer_assets=debug";

/// Install the global fmt subscriber.
///
/// `RUST_LOG` takes precedence over [`DEFAULT_FILTER`].
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    tracing::info!("Logging initialized");
}

/// Install the global fmt subscriber with an explicit filter directive.
pub fn init_with_filter(directive: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive))
        .init();
    tracing::info!("Logging initialized with filter '{}'", directive);
}

/// Install a subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call installs anything.
pub fn try_init_for_tests() {
    if tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("trace"))
        .with_test_writer()
        .try_init()
        .is_ok()
    {
        tracing::trace!("Test logging initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_init_for_tests_is_repeatable() {
        try_init_for_tests();
        try_init_for_tests();
        tracing::debug!("Logged after repeated init");
    }
}
