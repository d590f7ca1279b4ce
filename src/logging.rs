use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "themevars=info";

/// Install the global tracing subscriber. Safe to call more than once;
/// subsequent calls are no-ops.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
