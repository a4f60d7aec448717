//! Validated date catalog

use crate::schema::{RawConfig, RawContentDate, RawResolution, RawSchedule, RawUserDate};
use crate::validation::{parse_offset, parse_optional_timestamp, validate_config};
use crate::{CURRENT_CONFIG_VERSION, ConfigError, ConfigResult};
use std::collections::HashMap;
use tracing::warn;
use when_core::{
    ContentDate, ContentDateKey, DatePolicy, LearnerDate, ScheduleContext, UserDate,
    UserDateResolver,
};
use when_util::{CourseKey, Result, Timestamp, UsageKey, UserId, WhenError};

/// Validated catalog of content dates, learner schedules and learner records
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Resolver carrying the configured relative-date bounds
    pub resolver: UserDateResolver,

    pub content_dates: Vec<ContentDate>,

    /// Schedules by (learner, course)
    pub schedules: HashMap<(UserId, CourseKey), ScheduleContext>,

    pub user_dates: Vec<UserDate>,
}

impl Catalog {
    /// Validate a raw config and convert it.
    ///
    /// Invalid input never yields a catalog.
    pub fn from_raw(raw: RawConfig) -> ConfigResult<Self> {
        if raw.config_version != CURRENT_CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion(raw.config_version));
        }

        let errors = validate_config(&raw);
        if !errors.is_empty() {
            return Err(ConfigError::ValidationFailed { errors });
        }

        Ok(Self::convert(raw))
    }

    fn convert(raw: RawConfig) -> Self {
        let content_dates: Vec<ContentDate> =
            raw.content_dates.into_iter().map(convert_content_date).collect();

        let inactive: Vec<ContentDateKey> = content_dates
            .iter()
            .filter(|cd| !cd.active)
            .map(ContentDate::key)
            .collect();

        let user_dates: Vec<UserDate> = raw
            .user_dates
            .into_iter()
            .map(convert_user_date)
            .inspect(|ud| {
                if inactive.contains(&ud.content_date) {
                    warn!(
                        user = %ud.user,
                        content_date = %ud.content_date,
                        "User date refers to an inactive content date"
                    );
                }
            })
            .collect();

        let schedules = raw
            .schedules
            .into_iter()
            .map(convert_schedule)
            .collect();

        Self {
            resolver: convert_resolution(raw.resolution),
            content_dates,
            schedules,
            user_dates,
        }
    }

    /// Get a content date by location and field
    pub fn content_date(&self, key: &ContentDateKey) -> Result<&ContentDate> {
        self.content_dates
            .iter()
            .find(|cd| cd.location == key.location && cd.field == key.field)
            .ok_or_else(|| WhenError::ContentDateNotFound {
                location: key.location.clone(),
                field: key.field.clone(),
            })
    }

    /// All content dates of a course, active or not
    pub fn course_dates<'a>(
        &'a self,
        course_id: &'a CourseKey,
    ) -> impl Iterator<Item = &'a ContentDate> + 'a {
        self.content_dates
            .iter()
            .filter(move |cd| &cd.course_id == course_id)
    }

    pub fn schedule_for(&self, user: &UserId, course_id: &CourseKey) -> Option<&ScheduleContext> {
        self.schedules.get(&(user.clone(), course_id.clone()))
    }

    /// Records belonging to one learner
    pub fn user_dates_for<'a>(&'a self, user: &'a UserId) -> impl Iterator<Item = &'a UserDate> + 'a {
        self.user_dates.iter().filter(move |ud| &ud.user == user)
    }

    /// Resolve one content date for a learner.
    pub fn learner_date(&self, user: &UserId, key: &ContentDateKey) -> Result<LearnerDate> {
        let content = self.content_date(key)?;
        let schedule = self.schedule_for(user, &content.course_id);
        let user_date = self
            .user_dates_for(user)
            .filter(|ud| &ud.content_date == key)
            .last();

        self.resolver
            .resolve(content, schedule, user_date)
            .map_err(|e| explain_missing_schedule(e, user, &content.course_id))
    }

    /// Resolve every active content date of a course for a learner.
    pub fn learner_dates(&self, user: &UserId, course_id: &CourseKey) -> Result<Vec<LearnerDate>> {
        let schedule = self.schedule_for(user, course_id);

        self.resolver
            .resolve_all(self.course_dates(course_id), schedule, self.user_dates_for(user))
            .map_err(|e| explain_missing_schedule(e, user, course_id))
    }
}

/// Name the learner and course when a relative date had no schedule
fn explain_missing_schedule(err: WhenError, user: &UserId, course_id: &CourseKey) -> WhenError {
    match err {
        WhenError::MissingSchedule => WhenError::ScheduleNotFound {
            user: user.clone(),
            course_id: course_id.clone(),
        },
        other => other,
    }
}

// Conversion helpers. Only reached through `Catalog::from_raw`, after
// validation, so the fallbacks below never fire.

fn timestamp_or_none(value: Option<&str>) -> Option<Timestamp> {
    parse_optional_timestamp(value).ok().flatten()
}

fn convert_resolution(raw: RawResolution) -> UserDateResolver {
    UserDateResolver::new(
        timestamp_or_none(raw.relative_cutoff.as_deref()),
        timestamp_or_none(raw.relative_end.as_deref()),
    )
}

fn convert_content_date(raw: RawContentDate) -> ContentDate {
    let abs_date = timestamp_or_none(raw.abs_date.as_deref());
    let rel_date = parse_offset(raw.rel_days, raw.rel_seconds).ok().flatten();

    ContentDate {
        course_id: CourseKey::new(raw.course_id),
        location: UsageKey::new(raw.location),
        field: raw.field,
        active: raw.active,
        block_type: raw.block_type,
        policy: DatePolicy::new(abs_date, rel_date).unwrap_or_default(),
    }
}

fn convert_schedule(raw: RawSchedule) -> ((UserId, CourseKey), ScheduleContext) {
    let created = timestamp_or_none(Some(raw.created.as_str())).unwrap_or_default();
    let start_date = timestamp_or_none(raw.start_date.as_deref()).unwrap_or(created);

    (
        (UserId::new(raw.user), CourseKey::new(raw.course_id)),
        ScheduleContext::new(created, start_date),
    )
}

fn convert_user_date(raw: RawUserDate) -> UserDate {
    let mut user_date = UserDate::new(
        UserId::new(raw.user),
        ContentDateKey::new(raw.location, raw.field),
    )
    .with_reason(raw.reason)
    .gated(raw.is_content_gated);

    if let Some(actor) = raw.actor {
        user_date = user_date.with_actor(UserId::new(actor));
    }

    if let Some(abs_date) = timestamp_or_none(raw.abs_date.as_deref()) {
        user_date = user_date.with_abs_date(abs_date);
    } else if let Ok(Some(rel_date)) = parse_offset(raw.rel_days, raw.rel_seconds) {
        user_date = user_date.with_rel_date(rel_date);
    }

    user_date
}
