//! Logging setup.
//!
//! Everything is written to **stderr**: a host that drives the provider over
//! stdout must never see log lines there.
//!
//! # Quick Start
//!
//! ```no_run
//! use meraki_provider::{init_logging, MerakiProvider};
//!
//! init_logging();
//! tracing::info!("Starting provider");
//! let provider = MerakiProvider::new();
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: filter directives (e.g. `info`, `meraki_provider=debug`)
//!
//! ```bash
//! # Every Dashboard request and retry decision
//! RUST_LOG=meraki_provider=debug ./my-host
//!
//! # Response bodies too
//! RUST_LOG=meraki_provider::client=trace ./my-host
//! ```

use tracing::Subscriber;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn subscriber(default_level: &str) -> impl Subscriber + Send + Sync + 'static {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false),
    )
}

/// Install the stderr subscriber at `info` unless `RUST_LOG` says otherwise.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    subscriber("info").init();
}

/// Like [`init_logging`], with `default_level` used when `RUST_LOG` is unset.
///
/// ```no_run
/// meraki_provider::init_logging_with_default("meraki_provider=debug");
/// ```
pub fn init_logging_with_default(default_level: &str) {
    subscriber(default_level).init();
}

/// Try to install the subscriber. Returns `false` if one was already set.
pub fn try_init_logging() -> bool {
    subscriber("info").try_init().is_ok()
}

#[cfg(test)]
mod tests {
    // The global subscriber can only be set once per process, so only the
    // filter syntax and the idempotent entry point are exercised here.

    use super::*;

    #[test]
    fn test_env_filter_parsing() {
        assert!(EnvFilter::try_new("info").is_ok());
        assert!(EnvFilter::try_new("meraki_provider=debug").is_ok());
        assert!(EnvFilter::try_new("warn,meraki_provider::client=trace").is_ok());
    }

    #[test]
    fn test_try_init_is_idempotent() {
        try_init_logging();
        assert!(!try_init_logging());
    }
}
