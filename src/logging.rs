use tracing_subscriber::EnvFilter;

/// Level used when debug logging is off.
pub const DEFAULT_LEVEL: &str = "info";

/// Build the filter for the given settings flag.
///
/// With `debug` enabled `RUST_LOG` may refine the level; otherwise the level is
/// pinned to [`DEFAULT_LEVEL`] so a stray environment variable cannot flood the
/// output with protocol traffic.
pub fn filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new(DEFAULT_LEVEL)
    }
}

/// Install the global subscriber. Calling this more than once is harmless.
pub fn init(debug: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(debug))
        .with_target(false)
        .try_init();
}
