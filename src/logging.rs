//! Tracing subscriber setup for the binary.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a compact `fmt` subscriber.
///
/// `RUST_LOG` wins when set. Otherwise the engine logs at `info`, or at
/// `debug` with `verbose`.
pub fn init_logger(verbose: bool) {
    let default_filter = if verbose {
        "payroll_engine=debug,info"
    } else {
        "payroll_engine=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .compact(),
        )
        .init();
}
