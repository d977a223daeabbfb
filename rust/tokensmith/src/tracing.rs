//! Helpers to wrangle logging for tokensmith consumers
//!
//! NOTE: [initialize_tracing] should only ever be called in tests or
//! binaries; a library should only concern itself with instrumentation.
use std::sync::Once;

static INITIALIZE_TRACING: Once = Once::new();

/// Install a global subscriber that honors `RUST_LOG`. Subsequent calls do
/// nothing.
pub fn initialize_tracing() {
    use tracing_subscriber::prelude::*;
    INITIALIZE_TRACING.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new(
                std::env::var("RUST_LOG").unwrap_or_else(|_| "tokensmith=info".into()),
            ))
            .with(tracing_subscriber::fmt::layer())
            .try_init();
    });
}
