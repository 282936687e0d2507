//! Servo bus abstraction
//!
//! This module defines the trait a bus backend implements and the records
//! it hands back to the session.

mod traits;

pub use traits::*;
