//! Structured logging for provider processes.
//!
//! Diagnostics go through the `tracing` ecosystem and are written to
//! **stderr**, keeping stdout free for whatever the host process expects
//! there. Filtering follows the `RUST_LOG` environment variable.
//!
//! ```bash
//! # Default info-level output
//! RUST_LOG=info ./my-provider
//!
//! # Debug output for this provider only
//! RUST_LOG=hemmer_provider_signalfx=debug ./my-provider
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the default stderr subscriber.
///
/// Respects `RUST_LOG` for filtering and falls back to `info` when it is
/// not set.
///
/// # Panics
///
/// Panics if a global subscriber has already been set. Use
/// [`try_init_logging`] where that can happen.
pub fn init_logging() {
    init_logging_with_default("info");
}

/// Like [`init_logging`], with a chosen filter for when `RUST_LOG` is not
/// set, e.g. `"debug"` or `"hemmer_provider_signalfx=debug"`.
pub fn init_logging_with_default(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .init();
}

/// Install the default subscriber unless one is already set.
///
/// Returns `true` when this call installed the subscriber and `false`
/// when one was already in place, which makes it safe to call from every
/// test that wants log output.
pub fn try_init_logging() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .try_init()
        .is_ok()
}
