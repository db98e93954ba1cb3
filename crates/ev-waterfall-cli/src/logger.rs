//! Logger set-up for the `evw` binary.
//!
//! Everything goes to stderr so that stdout only carries the formatted result.
//! The level comes from the `EVW_LOG_LEVEL` environment variable.
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use log::{LevelFilter, Record};
use std::env;
use std::fmt::{Arguments, Display};

/// Used when `EVW_LOG_LEVEL` is unset.
const DEFAULT_LOG_LEVEL: &str = "warn";

const LOG_LEVEL_VAR: &str = "EVW_LOG_LEVEL";

/// Initialise the logger with colourised level names when stderr is a terminal.
///
/// Accepted levels: `off`, `error`, `warn`, `info`, `debug`, `trace`.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    let log_level = env::var(LOG_LEVEL_VAR).unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
    let log_level = parse_level(&log_level)?;

    let colours = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);
    let use_colour = atty::is(atty::Stream::Stderr);

    Dispatch::new()
        .format(move |out, message, record| {
            if use_colour {
                write_log(out, colours.color(record.level()), record, message);
            } else {
                write_log(out, record.level(), record, message);
            }
        })
        .level(log_level)
        .chain(std::io::stderr())
        .apply()?;

    Ok(())
}

fn parse_level(level: &str) -> Result<LevelFilter, String> {
    match level.to_lowercase().as_str() {
        "off" => Ok(LevelFilter::Off),
        "error" => Ok(LevelFilter::Error),
        "warn" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        unknown => Err(format!("Unknown log level in {LOG_LEVEL_VAR}: {unknown}")),
    }
}

fn write_log<T: Display>(out: FormatCallback, level: T, record: &Record, message: &Arguments) {
    let timestamp = Local::now().format("%H:%M:%S");
    out.finish(format_args!("[{timestamp} {level} {}] {message}", record.target()));
}
