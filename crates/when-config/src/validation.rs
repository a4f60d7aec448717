//! Catalog validation

use crate::schema::{RawConfig, RawContentDate, RawSchedule, RawUserDate};
use chrono::TimeDelta;
use std::collections::HashSet;
use thiserror::Error;
use when_core::DatePolicy;
use when_util::{Timestamp, offset_from_parts, parse_timestamp};

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Content date '{key}': {message}")]
    ContentDateError { key: String, message: String },

    #[error("Duplicate content date: {0}")]
    DuplicateContentDate(String),

    #[error("Schedule for '{user}' in '{course_id}': {message}")]
    ScheduleError {
        user: String,
        course_id: String,
        message: String,
    },

    #[error("Duplicate schedule for '{user}' in '{course_id}'")]
    DuplicateSchedule { user: String, course_id: String },

    #[error("User date for '{user}' on '{key}': {message}")]
    UserDateError {
        user: String,
        key: String,
        message: String,
    },

    #[error("User date for '{user}' references unknown content date '{key}'")]
    UnknownContentDate { user: String, key: String },

    #[error("Invalid timestamp '{value}': {message}")]
    InvalidTimestamp { value: String, message: String },
}

/// Validate a raw catalog
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for value in [
        &config.resolution.relative_cutoff,
        &config.resolution.relative_end,
    ] {
        if let Err(e) = parse_optional_timestamp(value.as_deref()) {
            errors.push(e);
        }
    }

    let mut seen_keys = HashSet::new();
    for content in &config.content_dates {
        let key = content_key(&content.location, &content.field);
        if !seen_keys.insert(key.clone()) {
            errors.push(ValidationError::DuplicateContentDate(key));
        }
        errors.extend(validate_content_date(content));
    }

    let mut seen_schedules = HashSet::new();
    for schedule in &config.schedules {
        if !seen_schedules.insert((&schedule.user, &schedule.course_id)) {
            errors.push(ValidationError::DuplicateSchedule {
                user: schedule.user.clone(),
                course_id: schedule.course_id.clone(),
            });
        }
        errors.extend(validate_schedule(schedule));
    }

    for user_date in &config.user_dates {
        let key = content_key(&user_date.location, &user_date.field);
        if !seen_keys.contains(&key) {
            errors.push(ValidationError::UnknownContentDate {
                user: user_date.user.clone(),
                key: key.clone(),
            });
        }
        errors.extend(validate_user_date(user_date, &key));
    }

    errors
}

fn validate_content_date(content: &RawContentDate) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let key = content_key(&content.location, &content.field);

    for (name, value) in [
        ("course_id", &content.course_id),
        ("location", &content.location),
        ("field", &content.field),
    ] {
        if value.is_empty() {
            errors.push(ValidationError::ContentDateError {
                key: key.clone(),
                message: format!("{} cannot be empty", name),
            });
        }
    }

    let abs_date = parse_optional_timestamp(content.abs_date.as_deref());
    let rel_date = parse_offset(content.rel_days, content.rel_seconds);

    if let Err(message) = &rel_date {
        errors.push(ValidationError::ContentDateError {
            key: key.clone(),
            message: message.clone(),
        });
    }

    match abs_date {
        Err(e) => errors.push(e),
        Ok(abs_date) => {
            if let Ok(rel_date) = rel_date
                && let Err(e) = DatePolicy::new(abs_date, rel_date)
            {
                errors.push(ValidationError::ContentDateError {
                    key,
                    message: e.to_string(),
                });
            }
        }
    }

    errors
}

fn validate_schedule(schedule: &RawSchedule) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if schedule.user.is_empty() || schedule.course_id.is_empty() {
        errors.push(ValidationError::ScheduleError {
            user: schedule.user.clone(),
            course_id: schedule.course_id.clone(),
            message: "user and course_id cannot be empty".into(),
        });
    }

    if let Err(e) = parse_optional_timestamp(Some(schedule.created.as_str())) {
        errors.push(e);
    }
    if let Err(e) = parse_optional_timestamp(schedule.start_date.as_deref()) {
        errors.push(e);
    }

    errors
}

fn validate_user_date(user_date: &RawUserDate, key: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if user_date.user.is_empty() {
        errors.push(ValidationError::UserDateError {
            user: String::new(),
            key: key.to_string(),
            message: "user cannot be empty".into(),
        });
    }

    let abs_date = parse_optional_timestamp(user_date.abs_date.as_deref());
    let rel_date = parse_offset(user_date.rel_days, user_date.rel_seconds);

    if let Err(e) = &abs_date {
        errors.push(e.clone());
    }
    if let Err(message) = &rel_date {
        errors.push(ValidationError::UserDateError {
            user: user_date.user.clone(),
            key: key.to_string(),
            message: message.clone(),
        });
    }

    if let (Ok(Some(_)), Ok(Some(_))) = (&abs_date, &rel_date) {
        errors.push(ValidationError::UserDateError {
            user: user_date.user.clone(),
            key: key.to_string(),
            message: "absolute and relative dates cannot both be set".into(),
        });
    }

    errors
}

/// Display key for a content date
pub(crate) fn content_key(location: &str, field: &str) -> String {
    format!("{}/{}", location, field)
}

/// Parse an optional timestamp string
pub fn parse_optional_timestamp(value: Option<&str>) -> Result<Option<Timestamp>, ValidationError> {
    value
        .map(|s| {
            parse_timestamp(s).map_err(|message| ValidationError::InvalidTimestamp {
                value: s.to_string(),
                message,
            })
        })
        .transpose()
}

/// Combine day and second parts into an offset. `None` when neither is set.
pub fn parse_offset(days: Option<i64>, seconds: Option<i64>) -> Result<Option<TimeDelta>, String> {
    if days.is_none() && seconds.is_none() {
        return Ok(None);
    }

    offset_from_parts(days.unwrap_or(0), seconds.unwrap_or(0))
        .map(Some)
        .ok_or_else(|| "Relative offset is out of range".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RawResolution;

    fn content(block: &str) -> RawContentDate {
        RawContentDate {
            course_id: "course-v1:TestX+Test+2025".into(),
            location: format!("block-v1:TestX+Test+2025+type@sequential+block@{}", block),
            field: "due".into(),
            active: true,
            block_type: "sequential".into(),
            abs_date: None,
            rel_days: None,
            rel_seconds: None,
        }
    }

    fn user_date(block: &str) -> RawUserDate {
        RawUserDate {
            user: "test_user".into(),
            location: format!("block-v1:TestX+Test+2025+type@sequential+block@{}", block),
            field: "due".into(),
            abs_date: None,
            rel_days: None,
            rel_seconds: None,
            reason: String::new(),
            actor: None,
            is_content_gated: false,
        }
    }

    fn config(content_dates: Vec<RawContentDate>, user_dates: Vec<RawUserDate>) -> RawConfig {
        RawConfig {
            config_version: 1,
            resolution: RawResolution::default(),
            content_dates,
            schedules: vec![],
            user_dates,
        }
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset(None, None).unwrap(), None);
        assert_eq!(parse_offset(Some(1), None).unwrap(), Some(TimeDelta::days(1)));
        assert_eq!(
            parse_offset(Some(1), Some(3600)).unwrap(),
            Some(TimeDelta::seconds(90_000))
        );
        assert!(parse_offset(Some(i64::MAX), None).is_err());
    }

    #[test]
    fn test_valid_config() {
        let mut absolute = content("a");
        absolute.abs_date = Some("2025-01-15 10:00:00".into());
        let mut relative = content("b");
        relative.rel_days = Some(7);

        let errors = validate_config(&config(vec![absolute, relative, content("c")], vec![]));
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn test_mixed_dates_detected() {
        let mut mixed = content("a");
        mixed.abs_date = Some("2020-01-01".into());
        mixed.rel_days = Some(1);

        let errors = validate_config(&config(vec![mixed], vec![]));
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], ValidationError::ContentDateError { message, .. }
            if message.contains("cannot both be set")));
    }

    #[test]
    fn test_duplicate_content_date_detection() {
        let errors = validate_config(&config(vec![content("a"), content("a")], vec![]));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::DuplicateContentDate(_))));
    }

    #[test]
    fn test_bad_timestamp_detected() {
        let mut bad = content("a");
        bad.abs_date = Some("next tuesday".into());

        let errors = validate_config(&config(vec![bad], vec![]));
        assert!(matches!(&errors[0], ValidationError::InvalidTimestamp { value, .. }
            if value == "next tuesday"));
    }

    #[test]
    fn test_unknown_content_date_reference() {
        let errors = validate_config(&config(vec![content("a")], vec![user_date("missing")]));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::UnknownContentDate { .. })));
    }

    #[test]
    fn test_user_date_mixed_override() {
        let mut ud = user_date("a");
        ud.abs_date = Some("2025-02-01".into());
        ud.rel_seconds = Some(60);

        let errors = validate_config(&config(vec![content("a")], vec![ud]));
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ValidationError::UserDateError { .. }));
    }

    #[test]
    fn test_duplicate_schedule_detection() {
        let schedule = RawSchedule {
            user: "test_user".into(),
            course_id: "course-v1:TestX+Test+2025".into(),
            created: "2025-01-01".into(),
            start_date: None,
        };
        let mut cfg = config(vec![], vec![]);
        cfg.schedules = vec![schedule.clone(), schedule];

        let errors = validate_config(&cfg);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ValidationError::DuplicateSchedule { .. }));
    }

    #[test]
    fn test_bad_resolution_bounds() {
        let mut cfg = config(vec![], vec![]);
        cfg.resolution.relative_end = Some("soon".into());

        let errors = validate_config(&cfg);
        assert!(matches!(errors[0], ValidationError::InvalidTimestamp { .. }));
    }
}
