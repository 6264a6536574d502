//! Diagnostic logging setup.

use log::LevelFilter;

/// Maps the number of `-v` flags to a level filter.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Installs `env_logger` on stderr. `RUST_LOG`, when set, wins over `verbosity`.
pub fn init(verbosity: u8) {
    let result = env_logger::Builder::new()
        .filter_level(level_for(verbosity))
        .format_timestamp(Some(env_logger::fmt::TimestampPrecision::Seconds))
        .parse_default_env()
        .try_init();

    if let Err(e) = result {
        eprintln!("Warning: logging is unavailable: {}", e);
    }
}
