//! Date resolution core
//!
//! This crate contains:
//! - `DatePolicy`: absolute or schedule-relative date rules
//! - `ContentDate` / `UserDate`: the records those rules hang off
//! - `UserDateResolver`: the date and access decision shown to one learner
//!
//! Everything here is a pure computation over values passed in by the caller.

mod content;
mod policy;
mod resolver;

pub use content::*;
pub use policy::*;
pub use resolver::*;
