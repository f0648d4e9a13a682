use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Install the global subscriber, writing to stderr so command output on
/// stdout stays clean. `LEDGERCAST_LOG` wins over `RUST_LOG`, which wins over
/// `default_level`. Later calls are no-ops.
pub fn init(default_level: &str) {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("LEDGERCAST_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .or_else(|_| EnvFilter::try_new(default_level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}
