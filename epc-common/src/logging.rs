//! Tracing setup for hosts and tests.

use std::sync::Once;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

static INIT: Once = Once::new();

/// Install the global tracing subscriber at the given level.
///
/// Safe to call multiple times; initialization only happens once. `RUST_LOG`
/// takes precedence over the configured level when set.
pub fn init_tracing(level: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(format!("epc={level},epc_common={level}")))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .compact();

        let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);

        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_tracing("debug");
        init_tracing("trace");
        tracing::debug!("subscriber installed");
    }
}
