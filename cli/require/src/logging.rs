//! Log output setup.
//!
//! `RUST_LOG` takes precedence; otherwise `info`, or `debug` with `--verbose`.
//! Logs go to stderr so command output on stdout stays machine-readable.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_logging(verbose: bool) {
    let env_filter = match std::env::var("RUST_LOG") {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) if verbose => EnvFilter::new("debug"),
        Err(_) => EnvFilter::new("info"),
    };

    // A second initialization (e.g. from tests) is ignored.
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_ansi(std::env::var_os("NO_COLOR").is_none()),
        )
        .with(env_filter)
        .try_init();
}
