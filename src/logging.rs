//! Logging setup for the publisher binary.
//!
//! Respects `RUST_LOG` (default filter `testledger=info`) and switches to
//! JSON lines on stderr when `RUST_LOG_FORMAT=json`, so CI jobs can ship
//! the publish log alongside the results they publish.

use tracing_subscriber::EnvFilter;

fn json_output_requested() -> bool {
    std::env::var("RUST_LOG_FORMAT")
        .map(|value| value.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Install the global tracing subscriber. Idempotent: repeated calls
/// leave the first subscriber in place.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("testledger=info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    if json_output_requested() {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
}
