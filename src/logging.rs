use tracing_subscriber::{EnvFilter, filter::LevelFilter};

/// Environment variable holding an `EnvFilter` directive string.
pub const LOG_ENV: &str = "PEAKRDL_LOG";

/// Installs the stderr subscriber. `$PEAKRDL_LOG` overrides `default_level`.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_logging(default_level: LevelFilter) {
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
