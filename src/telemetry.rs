//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber, writing to stderr so stdout stays reserved
/// for results. `RUST_LOG` takes precedence over `default_level`.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(default_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
