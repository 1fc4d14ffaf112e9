//! Error types for the application.
//!
//! A small `thiserror` hierarchy: [`AppError`] is the top-level type returned
//! from the main application logic; [`InputError`] covers log-file access.
//!
//! Malformed log lines are deliberately *not* represented here — the
//! classifier drops them and ingestion continues. The only fatal conditions
//! are a missing log file at startup and terminal I/O failure.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error encompassing all failure modes.
///
/// Domain errors convert via `From`, so call sites compose with `?`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to read the target log file. Fatal: without input the viewer
    /// has nothing to show. Reported to the operator before the TUI starts.
    #[error("Failed to read input: {0}")]
    Input(#[from] InputError),

    /// Terminal or TUI rendering error (crossterm/ratatui layer). Fatal:
    /// cleanup the terminal and exit.
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Errors encountered when reading the target log file.
#[derive(Debug, Error)]
pub enum InputError {
    /// The log file does not exist at the given path.
    ///
    /// Raised at startup, before entering interactive mode. The `path`
    /// carries the full path attempted so the operator sees exactly what
    /// was tried.
    #[error("Log file not found: {path}")]
    FileNotFound {
        /// The path that was attempted.
        path: PathBuf,
    },

    /// Any other I/O failure while opening or reading the file.
    #[error("I/O error reading log file: {0}")]
    Io(#[from] std::io::Error),
}
