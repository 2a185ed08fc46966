use std::env;

use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, prelude::*};

/// Logs go to stderr so that stdout only carries reports.
pub fn initialize_tracing() {
    let (level, env_filter) = parse_rust_log();
    let format = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(format.with_filter(LevelFilter::from(level)))
        .with(env_filter)
        .try_init();
}

/// A plain level in `RUST_LOG` is applied on top of the default targets; anything else
/// is used as a filter directive verbatim.
pub fn parse_rust_log() -> (Level, EnvFilter) {
    let level = match env::var(EnvFilter::DEFAULT_ENV) {
        Ok(value) => match value.parse::<Level>() {
            Ok(level) => level,
            Err(_) => return (Level::TRACE, EnvFilter::new(value)),
        },
        Err(_) => Level::INFO,
    };

    let env_filter = EnvFilter::new(
        "INFO,\
        tablebench=TRACE,\
        tablebench_core=TRACE,\
        tablebench_memstore=TRACE,\
        ",
    );

    (level, env_filter)
}
