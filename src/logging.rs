use std::io;
use tracing_subscriber::EnvFilter;

/// Installs a stderr fmt subscriber. `RUST_LOG` wins over `level` when set.
///
/// A second call is a no-op, so tests may call it freely.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
