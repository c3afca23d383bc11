//! Test logging bootstrap shared by unit and integration tests.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Default filter when neither `TEST_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_TEST_FILTER: &str = "warn";

/// Install a test subscriber exactly once.
///
/// Filter precedence: `TEST_LOG`, then `RUST_LOG`, then [`DEFAULT_TEST_FILTER`].
/// Output goes through the test writer so cargo/nextest capture it, without
/// timestamps so logs diff cleanly. Safe to call from every test.
///
/// ```bash
/// TEST_LOG=skate_backend=debug cargo test -p skate-backend
/// ```
pub fn init() {
    INITIALIZED.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_TEST_FILTER));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .with_target(true)
            .try_init()
            .ok();
    });
}
