//! Configuration templates
//!
//! A template is an ordered list of register writes describing a known
//! good servo configuration. Its id is also the bus id the servo takes
//! once the template has been applied.

mod database;

pub use database::*;
