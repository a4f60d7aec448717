//! Error types for date resolution

use thiserror::Error;

use crate::{CourseKey, UsageKey, UserId};

/// Core error type for date resolution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WhenError {
    /// A record mixes an absolute and a relative date
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// A relative date was resolved without a schedule to anchor it
    #[error("Missing schedule: relative dates require a learner schedule")]
    MissingSchedule,

    #[error("Date out of range: {0}")]
    DateOutOfRange(String),

    #[error("Content date not found: {location} ({field})")]
    ContentDateNotFound { location: UsageKey, field: String },

    #[error("No schedule for user {user} in course {course_id}")]
    ScheduleNotFound { user: UserId, course_id: CourseKey },
}

impl WhenError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    pub fn out_of_range(msg: impl Into<String>) -> Self {
        Self::DateOutOfRange(msg.into())
    }

    /// True for errors caused by an invalid record rather than missing context
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::ConfigurationError(_))
    }
}

pub type Result<T> = std::result::Result<T, WhenError>;
