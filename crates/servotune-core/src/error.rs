//! Error types for bus operations
//!
//! Every [`DeviceBus`](crate::bus::DeviceBus) operation reports failures
//! through [`BusError`]. The session treats all of them as recoverable.

use crate::{RegisterAddr, ServoId};
use thiserror::Error;

/// Errors reported by a servo bus backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The bus connection could not be opened
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The bus has already been closed
    #[error("Bus is closed")]
    Closed,

    /// No servo answered at the given id
    #[error("No response from servo {0}")]
    NoResponse(ServoId),

    /// The servo does not have a register at this address
    #[error("Servo {id} has no register {addr}")]
    NoSuchRegister {
        /// Servo that was addressed
        id: ServoId,
        /// Register that was requested
        addr: RegisterAddr,
    },

    /// Write to a read-only register
    #[error("Register {addr} on servo {id} is read-only")]
    ReadOnly {
        /// Servo that was addressed
        id: ServoId,
        /// Register that was written
        addr: RegisterAddr,
    },

    /// Write to an EEPROM register while the EEPROM is locked
    #[error("Register {addr} on servo {id} is write protected (EEPROM locked)")]
    EepromLocked {
        /// Servo that was addressed
        id: ServoId,
        /// Register that was written
        addr: RegisterAddr,
    },

    /// Value does not fit the register width
    #[error("Value {value} out of range for register {addr}")]
    ValueOutOfRange {
        /// Register that was written
        addr: RegisterAddr,
        /// Rejected value
        value: u16,
    },

    /// The servo reported an error status for the transaction
    #[error("Servo {id} reported error status 0x{status:02X}")]
    Status {
        /// Servo that answered
        id: ServoId,
        /// Raw status byte
        status: u8,
    },

    /// Transport-level failure
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for BusError {
    fn from(e: std::io::Error) -> Self {
        BusError::Io(e.to_string())
    }
}

/// Result type for bus operations
pub type Result<T> = core::result::Result<T, BusError>;
