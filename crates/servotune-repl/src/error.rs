//! Error types for the REPL

use thiserror::Error;

/// Errors that can occur in the REPL
#[derive(Error, Debug)]
pub enum ReplError {
    /// I/O error (reading/writing stdin/stdout)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line editor failure other than Ctrl-C / Ctrl-D
    #[error("Line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}
