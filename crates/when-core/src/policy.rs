//! Date policies and their resolution against a learner schedule

use chrono::TimeDelta;
use when_util::{Result, Timestamp, WhenError};

/// Per-learner schedule anchor for relative dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleContext {
    /// When the schedule record was created. Cutoff and end bounds compare
    /// against this.
    pub created: Timestamp,
    /// Zero point for relative date math
    pub start_date: Timestamp,
}

impl ScheduleContext {
    pub fn new(created: Timestamp, start_date: Timestamp) -> Self {
        Self {
            created,
            start_date,
        }
    }

    /// Schedule without a distinct start date; anchored at creation time.
    pub fn anchored_at_creation(created: Timestamp) -> Self {
        Self::new(created, created)
    }
}

/// Whether a relative date applies to a given schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeApplicability {
    Applies,
    /// The schedule was created at or after the window closed
    ScheduleAfterEnd,
    /// The schedule was created at or after the cutoff
    ScheduleAfterCutoff,
}

impl RelativeApplicability {
    /// Evaluate both bounds against a schedule's creation time.
    ///
    /// The two bounds are independent disqualifiers; `end` is reported first
    /// when both fire.
    pub fn evaluate(
        schedule: &ScheduleContext,
        cutoff: Option<Timestamp>,
        end: Option<Timestamp>,
    ) -> Self {
        if let Some(end) = end
            && schedule.created >= end
        {
            return Self::ScheduleAfterEnd;
        }

        if let Some(cutoff) = cutoff
            && schedule.created >= cutoff
        {
            return Self::ScheduleAfterCutoff;
        }

        Self::Applies
    }

    pub fn applies(self) -> bool {
        self == Self::Applies
    }
}

/// Rule for computing a date: fixed, relative to a schedule, or none.
///
/// At most one of `abs_date` / `rel_date` is set. Every constructor and
/// setter validates that, so an instance is always valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DatePolicy {
    abs_date: Option<Timestamp>,
    rel_date: Option<TimeDelta>,
}

impl DatePolicy {
    /// Create a policy, rejecting one that sets both dates.
    pub fn new(abs_date: Option<Timestamp>, rel_date: Option<TimeDelta>) -> Result<Self> {
        let policy = Self { abs_date, rel_date };
        policy.validate()?;
        Ok(policy)
    }

    /// Policy that never yields a date
    pub fn none() -> Self {
        Self::default()
    }

    pub fn absolute(date: Timestamp) -> Self {
        Self {
            abs_date: Some(date),
            rel_date: None,
        }
    }

    pub fn relative(offset: TimeDelta) -> Self {
        Self {
            abs_date: None,
            rel_date: Some(offset),
        }
    }

    pub fn abs_date(&self) -> Option<Timestamp> {
        self.abs_date
    }

    pub fn rel_date(&self) -> Option<TimeDelta> {
        self.rel_date
    }

    pub fn is_relative(&self) -> bool {
        self.abs_date.is_none() && self.rel_date.is_some()
    }

    /// Check the one-of invariant.
    pub fn validate(&self) -> Result<()> {
        if self.abs_date.is_some() && self.rel_date.is_some() {
            return Err(WhenError::configuration(
                "Absolute and relative dates cannot both be set on a date policy",
            ));
        }
        Ok(())
    }

    /// Replace the absolute date. Leaves the policy unchanged on error.
    pub fn set_abs_date(&mut self, abs_date: Option<Timestamp>) -> Result<()> {
        let updated = Self {
            abs_date,
            ..*self
        };
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Replace the relative date. Leaves the policy unchanged on error.
    pub fn set_rel_date(&mut self, rel_date: Option<TimeDelta>) -> Result<()> {
        let updated = Self {
            rel_date,
            ..*self
        };
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Resolve the date this policy yields.
    ///
    /// Absolute dates ignore `schedule`, `cutoff` and `end`. Relative dates
    /// need a schedule and are dropped (`Ok(None)`) when the schedule was
    /// created at or after `end`, or at or after `cutoff`.
    pub fn actual_date(
        &self,
        schedule: Option<&ScheduleContext>,
        cutoff: Option<Timestamp>,
        end: Option<Timestamp>,
    ) -> Result<Option<Timestamp>> {
        let rel_date = match (self.abs_date, self.rel_date) {
            (Some(abs_date), _) => return Ok(Some(abs_date)),
            (None, Some(rel_date)) => rel_date,
            (None, None) => return Ok(None),
        };

        let schedule = schedule.ok_or(WhenError::MissingSchedule)?;

        if !RelativeApplicability::evaluate(schedule, cutoff, end).applies() {
            return Ok(None);
        }

        schedule
            .start_date
            .checked_add_signed(rel_date)
            .map(Some)
            .ok_or_else(|| {
                WhenError::out_of_range(format!(
                    "{} offset from {} overflows",
                    rel_date, schedule.start_date
                ))
            })
    }
}
