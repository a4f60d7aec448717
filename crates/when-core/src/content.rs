//! Content dates and per-learner date records

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::fmt;
use when_util::{CourseKey, Result, Timestamp, UsageKey, UserId, WhenError};

use crate::DatePolicy;

/// Identifies one date field on one content block
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContentDateKey {
    pub location: UsageKey,
    pub field: String,
}

impl ContentDateKey {
    pub fn new(location: impl Into<UsageKey>, field: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            field: field.into(),
        }
    }
}

impl fmt::Display for ContentDateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.location, self.field)
    }
}

/// A date field ("due", "start", ...) on a content block, and the policy
/// that computes it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDate {
    pub course_id: CourseKey,
    pub location: UsageKey,
    pub field: String,
    /// Inactive dates are kept for history but never shown
    pub active: bool,
    pub block_type: String,
    pub policy: DatePolicy,
}

impl ContentDate {
    pub fn key(&self) -> ContentDateKey {
        ContentDateKey::new(self.location.clone(), self.field.clone())
    }
}

/// Per-learner override and gating state for one content date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDate {
    pub user: UserId,
    pub content_date: ContentDateKey,
    abs_date: Option<Timestamp>,
    rel_date: Option<TimeDelta>,
    pub reason: String,
    /// Who made the change, if recorded
    pub actor: Option<UserId>,
    pub is_content_gated: bool,
}

impl UserDate {
    /// Create a record with no date override.
    pub fn new(user: UserId, content_date: ContentDateKey) -> Self {
        Self {
            user,
            content_date,
            abs_date: None,
            rel_date: None,
            reason: String::new(),
            actor: None,
            is_content_gated: false,
        }
    }

    /// Override the learner's date with a fixed one. Clears any shift.
    pub fn with_abs_date(mut self, abs_date: Timestamp) -> Self {
        self.abs_date = Some(abs_date);
        self.rel_date = None;
        self
    }

    /// Shift the policy-resolved date for this learner. Clears any fixed override.
    pub fn with_rel_date(mut self, rel_date: TimeDelta) -> Self {
        self.rel_date = Some(rel_date);
        self.abs_date = None;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_actor(mut self, actor: UserId) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn gated(mut self, is_content_gated: bool) -> Self {
        self.is_content_gated = is_content_gated;
        self
    }

    pub fn abs_date(&self) -> Option<Timestamp> {
        self.abs_date
    }

    pub fn rel_date(&self) -> Option<TimeDelta> {
        self.rel_date
    }

    /// Set both override fields at once, rejecting a mix of fixed and shift.
    pub fn set_override(
        &mut self,
        abs_date: Option<Timestamp>,
        rel_date: Option<TimeDelta>,
    ) -> Result<()> {
        if abs_date.is_some() && rel_date.is_some() {
            return Err(WhenError::configuration(format!(
                "User date for {} on {}: absolute and relative dates cannot both be set",
                self.user, self.content_date
            )));
        }
        self.abs_date = abs_date;
        self.rel_date = rel_date;
        Ok(())
    }

    /// Whether the learner may access the content.
    ///
    /// Depends only on the gating flag, never on dates.
    pub fn learner_has_access(&self) -> bool {
        !self.is_content_gated
    }
}
