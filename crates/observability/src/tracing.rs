//! Tracing subscriber initialization.

use tracing_subscriber::EnvFilter;

/// Initialize the process-wide subscriber.
///
/// `RUST_LOG` wins over `default_directives` when set. Output is JSON lines
/// unless `WORKPASS_LOG_FORMAT=compact` asks for human-readable logs.
pub fn init(default_directives: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let compact = std::env::var("WORKPASS_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("compact"))
        .unwrap_or(false);

    // try_init so tests and repeated calls don't panic on double-install.
    let _ = if compact {
        builder.compact().try_init()
    } else {
        builder.json().try_init()
    };
}
