use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "WRAPGEN_LOG";

/// Filter used when `WRAPGEN_LOG` is unset. Data-quality warnings are logged
/// at `debug`, so they only appear from `-vv` on.
pub fn default_filter(verbosity: u8) -> EnvFilter {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    EnvFilter::new(level)
}

/// Install the global fmt subscriber. `verbosity` raises the default level
/// when `WRAPGEN_LOG` is unset; calling this twice is harmless.
pub fn init_logging(verbosity: u8) {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| default_filter(verbosity));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
