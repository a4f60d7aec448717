//! Shared utilities for learner date resolution
//!
//! This crate provides:
//! - Opaque identifier types (CourseKey, UsageKey, UserId)
//! - Timestamp and offset helpers
//! - Error types
//! - Default configuration path

mod error;
mod ids;
mod paths;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
