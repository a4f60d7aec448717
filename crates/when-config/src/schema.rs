//! Raw catalog schema (as parsed from TOML)

use serde::{Deserialize, Serialize};

/// Raw catalog as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Bounds applied to relative dates
    #[serde(default)]
    pub resolution: RawResolution,

    #[serde(default)]
    pub content_dates: Vec<RawContentDate>,

    #[serde(default)]
    pub schedules: Vec<RawSchedule>,

    #[serde(default)]
    pub user_dates: Vec<RawUserDate>,
}

/// Resolution settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawResolution {
    /// Schedules created at or after this moment get no relative dates
    pub relative_cutoff: Option<String>,

    /// Schedules created at or after the window closes get no relative dates
    pub relative_end: Option<String>,
}

/// Raw content date with its policy inlined
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawContentDate {
    pub course_id: String,

    pub location: String,

    /// Date field name, e.g. "due" or "start"
    pub field: String,

    #[serde(default = "default_active")]
    pub active: bool,

    #[serde(default)]
    pub block_type: String,

    /// Absolute date
    pub abs_date: Option<String>,

    /// Relative offset from the schedule start, in days
    pub rel_days: Option<i64>,

    /// Relative offset from the schedule start, in seconds (added to rel_days)
    pub rel_seconds: Option<i64>,
}

/// Learner schedule for one course
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawSchedule {
    pub user: String,

    pub course_id: String,

    pub created: String,

    /// Anchor for relative dates (default: created)
    pub start_date: Option<String>,
}

/// Per-learner override / gating record
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawUserDate {
    pub user: String,

    pub location: String,

    pub field: String,

    /// Fixed date override
    pub abs_date: Option<String>,

    /// Shift of the policy date, in days
    pub rel_days: Option<i64>,

    /// Shift of the policy date, in seconds (added to rel_days)
    pub rel_seconds: Option<i64>,

    #[serde(default)]
    pub reason: String,

    pub actor: Option<String>,

    #[serde(default)]
    pub is_content_gated: bool,
}

fn default_active() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_content_dates() {
        let toml_str = r#"
            config_version = 1

            [[content_dates]]
            course_id = "course-v1:TestX+Test+2025"
            location = "block-v1:TestX+Test+2025+type@sequential+block@test"
            field = "due"
            block_type = "sequential"
            abs_date = "2025-01-15 10:00:00"

            [[content_dates]]
            course_id = "course-v1:TestX+Test+2025"
            location = "block-v1:TestX+Test+2025+type@sequential+block@week2"
            field = "due"
            rel_days = 14
        "#;

        let config: RawConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.content_dates.len(), 2);
        assert!(config.content_dates[0].active);
        assert_eq!(config.content_dates[1].rel_days, Some(14));
        assert!(config.content_dates[1].block_type.is_empty());
    }

    #[test]
    fn parse_schedules_and_user_dates() {
        let toml_str = r#"
            config_version = 1

            [resolution]
            relative_end = "2026-01-01"

            [[schedules]]
            user = "test_user"
            course_id = "course-v1:TestX+Test+2025"
            created = "2025-01-01"

            [[user_dates]]
            user = "test_user"
            location = "block-v1:TestX+Test+2025+type@sequential+block@test"
            field = "due"
            rel_days = 2
            reason = "extension"
            is_content_gated = true
        "#;

        let config: RawConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.resolution.relative_end.as_deref(), Some("2026-01-01"));
        assert!(config.schedules[0].start_date.is_none());
        assert!(config.user_dates[0].is_content_gated);
        assert_eq!(config.user_dates[0].actor, None);
    }
}
