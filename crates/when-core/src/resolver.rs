//! Per-learner date resolution
//!
//! Combines a content date's policy with the learner's override record and
//! gating flag.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace};
use when_util::{CourseKey, Result, Timestamp, WhenError};

use crate::{ContentDate, ContentDateKey, RelativeApplicability, ScheduleContext, UserDate};

/// Where a learner's date came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    /// Computed from the content's policy
    Policy,
    /// Fixed per-learner override
    Override,
    /// Policy date moved by a per-learner shift
    Shifted,
    /// No date applies
    None,
}

/// The date and access decision shown to one learner for one content date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerDate {
    pub course_id: CourseKey,
    #[serde(flatten)]
    pub key: ContentDateKey,
    pub block_type: String,
    pub date: Option<Timestamp>,
    pub source: DateSource,
    pub has_access: bool,
}

/// Resolves content dates for individual learners.
///
/// `cutoff` and `end` bound which schedules receive relative dates; see
/// [`crate::DatePolicy::actual_date`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserDateResolver {
    pub cutoff: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

impl UserDateResolver {
    pub fn new(cutoff: Option<Timestamp>, end: Option<Timestamp>) -> Self {
        Self { cutoff, end }
    }

    /// Resolve one content date for a learner.
    ///
    /// Inactive content dates yield no date. Otherwise the policy is always
    /// resolved first, so its errors surface even when a fixed override then
    /// wins. A shift moves the policy date and leaves "no date" as is. Access
    /// comes from the gating flag alone, defaulting to allowed when there is
    /// no record.
    pub fn resolve(
        &self,
        content: &ContentDate,
        schedule: Option<&ScheduleContext>,
        user_date: Option<&UserDate>,
    ) -> Result<LearnerDate> {
        let key = content.key();

        if let Some(user_date) = user_date
            && user_date.content_date != key
        {
            return Err(WhenError::configuration(format!(
                "User date for {} does not belong to {}",
                user_date.content_date, key
            )));
        }

        let (date, source) = if !content.active {
            debug!(
                location = %key.location,
                field = %key.field,
                "Content date is inactive"
            );
            (None, DateSource::None)
        } else {
            let policy = self.policy_date(content, schedule, user_date)?;
            match user_date.and_then(UserDate::abs_date) {
                Some(abs_date) => (Some(abs_date), DateSource::Override),
                None => policy,
            }
        };

        let has_access = user_date.is_none_or(UserDate::learner_has_access);

        trace!(
            location = %key.location,
            field = %key.field,
            source = ?source,
            has_access,
            "Resolved learner date"
        );

        Ok(LearnerDate {
            course_id: content.course_id.clone(),
            key,
            block_type: content.block_type.clone(),
            date,
            source,
            has_access,
        })
    }

    fn policy_date(
        &self,
        content: &ContentDate,
        schedule: Option<&ScheduleContext>,
        user_date: Option<&UserDate>,
    ) -> Result<(Option<Timestamp>, DateSource)> {
        let policy_date = content.policy.actual_date(schedule, self.cutoff, self.end)?;

        let Some(policy_date) = policy_date else {
            if content.policy.is_relative()
                && let Some(schedule) = schedule
            {
                let reason = RelativeApplicability::evaluate(schedule, self.cutoff, self.end);
                debug!(
                    location = %content.location,
                    field = %content.field,
                    reason = ?reason,
                    "Relative date does not apply to this schedule"
                );
            }
            return Ok((None, DateSource::None));
        };

        match user_date.and_then(UserDate::rel_date) {
            Some(shift) => {
                let shifted = policy_date.checked_add_signed(shift).ok_or_else(|| {
                    WhenError::out_of_range(format!(
                        "Shift of {} from {} overflows",
                        shift, policy_date
                    ))
                })?;
                Ok((Some(shifted), DateSource::Shifted))
            }
            None => Ok((Some(policy_date), DateSource::Policy)),
        }
    }

    /// Resolve every active content date for one learner.
    ///
    /// `user_dates` should hold that learner's records; at most one per
    /// content date is used (the last one wins). Results are ordered by date,
    /// undated entries last.
    pub fn resolve_all<'a>(
        &self,
        contents: impl IntoIterator<Item = &'a ContentDate>,
        schedule: Option<&ScheduleContext>,
        user_dates: impl IntoIterator<Item = &'a UserDate>,
    ) -> Result<Vec<LearnerDate>> {
        let overrides: HashMap<&ContentDateKey, &UserDate> = user_dates
            .into_iter()
            .map(|ud| (&ud.content_date, ud))
            .collect();

        let mut resolved = contents
            .into_iter()
            .filter(|content| content.active)
            .map(|content| {
                let user_date = overrides.get(&content.key()).copied();
                self.resolve(content, schedule, user_date)
            })
            .collect::<Result<Vec<_>>>()?;

        resolved.sort_by(|a, b| {
            match (a.date, b.date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
            .then_with(|| a.key.cmp(&b.key))
        });

        Ok(resolved)
    }
}
