//! Log output for test binaries.
//!
//! Page objects, fixtures and drivers emit `tracing` spans and events; one
//! span per page-object step. Call [`init`] at the start of a test to see
//! them. Output goes through the test writer, so `cargo test` captures it
//! per test and shows it only for failures.

use std::sync::Once;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_DIRECTIVE: &str = "saucedemo_e2e=info";

/// Install the suite's subscriber once per process.
///
/// `RUST_LOG` overrides [`DEFAULT_DIRECTIVE`]. If another global subscriber
/// is already installed this does nothing.
pub fn init() {
    init_with(DEFAULT_DIRECTIVE);
}

/// Like [`init`] with a different fallback filter
pub fn init_with(directive: &str) {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_test_writer())
            .try_init();
    });
}
