//! Error types for logweave.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level application error wrapping all fatal failures
//!   - [`ConfigError`](crate::config::ConfigError) - config file, validation and template compilation
//!   - [`InputError`] - stdin could not be opened or read
//!   - [`LoggingError`](crate::logging::LoggingError) - tracing subscriber setup
//!   - `std::io::Error` - terminal/TUI failures
//!
//! # Recovery Strategy
//!
//! Only startup and terminal errors are fatal. Everything that can go wrong with a
//! single input line (malformed JSON, a template referencing a missing field) is
//! absorbed by the ingestion pipeline and turned into visible content instead. A
//! read error on the input stream ends ingestion but leaves the UI running.

use thiserror::Error;

/// Top-level application error encompassing all fatal failure modes.
///
/// All domain-specific error types convert into `AppError` via `From`, so `main`
/// and the TUI shell can propagate with `?`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded, validated or compiled.
    ///
    /// Raised before ingestion starts; the process aborts with the message.
    #[error("Config error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Failed to open the input stream.
    #[error("Failed to read input: {0}")]
    Input(#[from] InputError),

    /// Tracing subscriber could not be installed.
    #[error("Logging setup failed: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    /// Terminal or TUI rendering error.
    ///
    /// Without a working terminal the viewer cannot function; the shell restores
    /// the terminal on a best-effort basis and exits.
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

impl From<crate::view::TuiError> for AppError {
    fn from(err: crate::view::TuiError) -> Self {
        match err {
            crate::view::TuiError::Io(io) => AppError::Terminal(io),
        }
    }
}

/// Errors encountered when reading raw lines from the input stream.
#[derive(Debug, Error)]
pub enum InputError {
    /// stdin is an interactive terminal, so there is nothing to follow.
    ///
    /// Reported at startup: the viewer is meant to sit at the end of a pipe, e.g.
    /// `my-service | logweave`.
    #[error("No input source: pipe log output into logweave's stdin")]
    NoInput,

    /// I/O failure while reading the stream.
    ///
    /// After startup this is treated exactly like end-of-stream: ingestion stops
    /// and the UI shows the disconnected indicator.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn input_error_no_input_display() {
        let msg = InputError::NoInput.to_string();
        assert!(msg.contains("No input source"));
        assert!(msg.contains("stdin"));
    }

    #[test]
    fn input_error_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed");
        let input_err: InputError = io_err.into();
        let msg = input_err.to_string();
        assert!(msg.contains("IO error"));
        assert!(msg.contains("pipe closed"));
    }

    #[test]
    fn app_error_from_input_error() {
        let app_err: AppError = InputError::NoInput.into();
        let msg = app_err.to_string();
        assert!(msg.contains("Failed to read input"));
        assert!(msg.contains("No input source"));
    }

    #[test]
    fn app_error_from_config_error() {
        let config_err = crate::config::ConfigError::Blank {
            field: "level_field",
        };
        let app_err: AppError = config_err.into();
        let msg = app_err.to_string();
        assert!(msg.contains("Config error"));
        assert!(msg.contains("'level_field' cannot be blank"));
    }

    #[test]
    fn app_error_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::Other, "tty gone");
        let app_err: AppError = io_err.into();
        assert!(app_err.to_string().contains("Terminal error"));
        assert!(app_err.to_string().contains("tty gone"));
    }

    #[test]
    fn app_error_from_tui_error_is_terminal() {
        let tui_err = crate::view::TuiError::Io(io::Error::other("no tty"));
        let app_err: AppError = tui_err.into();
        assert!(matches!(app_err, AppError::Terminal(_)));
        assert!(app_err.to_string().contains("no tty"));
    }
}
