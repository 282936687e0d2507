//! servotune-core - Command session for configuring serial servos
//!
//! This crate holds everything between a line of user input and the
//! register operations it turns into:
//!
//! - [`bus::DeviceBus`] - the capability a servo bus backend provides
//!   (enumerate, read/write register, EEPROM lock control)
//! - [`family`] - register maps for the supported servo families
//! - [`template`] - the configuration template database (RON files)
//! - [`session`] - command parsing, the selection state machine and the
//!   template-load procedure
//!
//! # Example
//!
//! ```ignore
//! use servotune_core::session::{Selection, Session};
//! use servotune_core::template::TemplateDatabase;
//!
//! fn run_batch(bus: &mut dyn DeviceBus, db: &TemplateDatabase) {
//!     let mut session = Session::new(bus, db, std::io::stdout());
//!     let outcome = session
//!         .handle_line("select 1; readreg 9", Selection::None)
//!         .unwrap();
//!     assert_eq!(outcome.selection, Selection::Servo(1));
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod bus;
pub mod error;
pub mod family;
pub mod registers;
pub mod session;
pub mod template;

pub use error::{BusError, Result};

/// Bus address of a servo (0-253 on Feetech buses)
pub type ServoId = u8;

/// Address of a register within a servo's memory table
pub type RegisterAddr = u8;
