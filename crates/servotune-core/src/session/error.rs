//! Errors reported by the session

use std::io;

use thiserror::Error;

use super::command::ParseError;
use crate::error::BusError;
use crate::ServoId;

/// Why a command did not run (or did not finish)
///
/// Everything except [`CommandError::Output`] is reported to the user and
/// the session carries on with the next command.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Malformed command
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The command needs a selected servo and none is selected
    #[error("No servo selected")]
    NoServoSelected,

    /// `loadtemplate` with an id that is not in the database
    #[error("Unknown template: {0}")]
    UnknownTemplate(ServoId),

    /// The bus operation failed
    #[error(transparent)]
    Bus(#[from] BusError),

    /// Writing the report failed
    #[error("Output error: {0}")]
    Output(#[from] io::Error),
}
