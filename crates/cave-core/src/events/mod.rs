//! Event System
//!
//! The append-only turn log.

pub mod logger;

pub use logger::*;
