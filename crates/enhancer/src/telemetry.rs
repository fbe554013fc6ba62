//! Tracing setup for the binary.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize console logging on stderr.
///
/// `RUST_LOG` wins when set; otherwise `verbose` turns on debug output for the enhancer crates.
pub fn init_console_telemetry(verbose: bool) {
    let default_directives = if verbose {
        "info,enhancer=debug,enhancer_retry=debug,enhancer_rate_limit=debug,enhancer_openai=debug"
    } else {
        "warn"
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
