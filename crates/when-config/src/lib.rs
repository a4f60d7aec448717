//! Date catalog parsing and validation
//!
//! Supports TOML catalogs with:
//! - Versioned schema
//! - Content dates with absolute or relative policies
//! - Learner schedules and per-learner override/gating records
//! - Validation that reports every problem at once

mod catalog;
mod schema;
mod validation;

pub use catalog::*;
pub use schema::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Load and validate a catalog from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Catalog> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate a catalog from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Catalog> {
    let raw: RawConfig = toml::from_str(content)?;
    let catalog = Catalog::from_raw(raw)?;
    info!(
        content_dates = catalog.content_dates.len(),
        schedules = catalog.schedules.len(),
        user_dates = catalog.user_dates.len(),
        "Date catalog loaded"
    );

    Ok(catalog)
}

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_minimal_config() {
        let config = r#"
            config_version = 1

            [[content_dates]]
            course_id = "course-v1:TestX+Test+2025"
            location = "block-v1:TestX+Test+2025+type@sequential+block@test"
            field = "due"
            abs_date = "2025-01-15T10:00:00Z"
        "#;

        let catalog = parse_config(config).unwrap();
        assert_eq!(catalog.content_dates.len(), 1);
        assert_eq!(catalog.content_dates[0].field, "due");
    }

    #[test]
    fn parse_empty_catalog() {
        let catalog = parse_config("config_version = 1").unwrap();
        assert!(catalog.content_dates.is_empty());
        assert!(catalog.schedules.is_empty());
    }

    #[test]
    fn reject_wrong_version() {
        let result = parse_config("config_version = 99");
        assert!(matches!(result, Err(ConfigError::UnsupportedVersion(99))));
    }

    #[test]
    fn reject_mixed_policy() {
        let config = r#"
            config_version = 1

            [[content_dates]]
            course_id = "course-v1:TestX+Test+2025"
            location = "block-v1:TestX+Test+2025+type@sequential+block@test"
            field = "due"
            abs_date = "2020-01-01"
            rel_days = 1
        "#;

        let result = parse_config(config);
        assert!(matches!(result, Err(ConfigError::ValidationFailed { errors }) if errors.len() == 1));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "config_version = 1").unwrap();

        let catalog = load_config(file.path()).unwrap();
        assert!(catalog.user_dates.is_empty());
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }
}
