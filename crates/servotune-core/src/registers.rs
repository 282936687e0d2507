//! Register addresses the session relies on
//!
//! Both supported families share the lower part of the memory table, so
//! these addresses are the same for SMS/STS and SCSCL servos.

use crate::RegisterAddr;

/// Servo bus id (EEPROM)
pub const ID: RegisterAddr = 5;

/// Minimum position limit (EEPROM, 2 bytes)
pub const MIN_POSITION: RegisterAddr = 9;

/// Maximum position limit (EEPROM, 2 bytes)
pub const MAX_POSITION: RegisterAddr = 11;

/// Goal position (SRAM, 2 bytes)
pub const GOAL_POSITION: RegisterAddr = 42;
