//! Console logging.
//!
//! Installs a [`fern`] dispatcher behind the `log` facade. Lines are written to stdout as
//! `[Level] message`, e.g. `[Error] Cannot load shader file ./src/shaders/simple.vert !`.

use std::fmt;

use log::{Level, LevelFilter};

/// Title-cased label used as the line prefix.
pub fn level_label(level: Level) -> &'static str {
    match level {
        Level::Error => "Error",
        Level::Warn => "Warn",
        Level::Info => "Info",
        Level::Debug => "Debug",
        Level::Trace => "Trace",
    }
}

/// Formats one console line.
pub fn format_line(level: Level, message: &fmt::Arguments) -> String {
    format!("[{}] {}", level_label(level), message)
}

/// Installs the global logger. Fails only if a logger is already set.
pub fn init_logging(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("{}", format_line(record.level(), message)))
        })
        .level(level)
        .chain(std::io::stdout())
        .apply()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_labels() {
        assert_eq!(level_label(Level::Error), "Error");
        assert_eq!(level_label(Level::Warn), "Warn");
        assert_eq!(level_label(Level::Trace), "Trace");
    }

    #[test]
    fn test_error_line_format() {
        let line = format_line(
            Level::Error,
            &format_args!("Cannot get uniform {} location !", "MVPMatrix"),
        );
        assert_eq!(line, "[Error] Cannot get uniform MVPMatrix location !");
        assert_eq!(
            format_line(Level::Info, &format_args!("Linked shader program")),
            "[Info] Linked shader program"
        );
    }
}
