//! Device bus trait definitions

use crate::error::Result;
use crate::{RegisterAddr, ServoId};

/// A servo found on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoInfo {
    /// Bus id the servo answers to
    pub id: ServoId,
    /// Model number as reported by the servo
    pub model: u16,
}

/// A named register together with its current value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterValue {
    /// Register address
    pub addr: RegisterAddr,
    /// Register name from the family's memory table
    pub name: &'static str,
    /// Value read from the servo
    pub value: u16,
}

/// Device Bus trait
///
/// This trait represents a connection to a servo bus that can address
/// individual servos by id. Framing, checksums and retries are the
/// implementation's business; every method is a blocking
/// call-and-response operation.
///
/// Writes to EEPROM registers are expected to fail (or be ignored by the
/// hardware) unless [`unlock_eeprom`](DeviceBus::unlock_eeprom) was called
/// for that servo first.
pub trait DeviceBus {
    /// Find all servos that answer on the bus
    fn enumerate(&mut self) -> Result<Vec<ServoInfo>>;

    /// Read every register in the family's memory table for one servo
    fn list_registers(&mut self, id: ServoId) -> Result<Vec<RegisterValue>>;

    /// Allow writes to EEPROM registers on a servo
    fn unlock_eeprom(&mut self, id: ServoId) -> Result<()>;

    /// Protect EEPROM registers on a servo against writes
    fn lock_eeprom(&mut self, id: ServoId) -> Result<()>;

    /// Read a single register
    fn read_register(&mut self, id: ServoId, addr: RegisterAddr) -> Result<u16>;

    /// Write a single register
    ///
    /// An `Err` means the value was not stored. Template loads use this to
    /// abort the remaining writes.
    fn write_register(&mut self, id: ServoId, addr: RegisterAddr, value: u16) -> Result<()>;

    /// Release the underlying connection
    ///
    /// After `close` every other method returns [`BusError::Closed`](crate::BusError::Closed).
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
