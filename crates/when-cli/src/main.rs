//! when - resolve learner-facing content dates
//!
//! Loads a TOML date catalog and either validates it or prints the dates a
//! given learner sees in a course, with gating applied.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use when_config::{CURRENT_CONFIG_VERSION, Catalog, ConfigError, load_config};
use when_core::{DateSource, LearnerDate};
use when_util::{CourseKey, Timestamp, UserId, default_config_path, format_timestamp, now};

/// when - learner date resolution
#[derive(Parser, Debug)]
#[command(name = "when")]
#[command(about = "Resolve due and release dates for learners", long_about = None)]
struct Args {
    /// Log level (overridden by RUST_LOG)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a date catalog and print a summary
    Validate {
        /// Catalog path (default: $WHEN_CONFIG or ~/.config/when/dates.toml)
        config: Option<PathBuf>,
    },

    /// Print the dates one learner sees in one course
    Resolve {
        /// Catalog path (or set WHEN_CONFIG env var)
        #[arg(short, long, env = "WHEN_CONFIG", default_value_os_t = default_config_path())]
        config: PathBuf,

        #[arg(short, long)]
        user: String,

        #[arg(long)]
        course: String,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Whether a resolved date has passed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum DateStatus {
    Past,
    Upcoming,
}

#[derive(Debug, Serialize)]
struct DateRow<'a> {
    #[serde(flatten)]
    date: &'a LearnerDate,
    status: Option<DateStatus>,
}

fn status_at(date: Option<Timestamp>, at: Timestamp) -> Option<DateStatus> {
    date.map(|d| if d <= at { DateStatus::Past } else { DateStatus::Upcoming })
}

fn source_label(source: DateSource) -> &'static str {
    match source {
        DateSource::Policy => "policy",
        DateSource::Override => "override",
        DateSource::Shifted => "shifted",
        DateSource::None => "-",
    }
}

fn validate(config: Option<PathBuf>) -> ExitCode {
    let config_path = config.unwrap_or_else(default_config_path);

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match load_config(&config_path) {
        Ok(catalog) => {
            print_summary(&catalog);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Catalog validation failed");
            eprintln!();
            match &e {
                ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver, CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}

fn print_summary(catalog: &Catalog) {
    let active = catalog.content_dates.iter().filter(|cd| cd.active).count();
    let relative = catalog
        .content_dates
        .iter()
        .filter(|cd| cd.policy.is_relative())
        .count();
    let gated = catalog
        .user_dates
        .iter()
        .filter(|ud| !ud.learner_has_access())
        .count();

    println!("✓ Catalog is valid");
    println!();
    println!("Summary:");
    println!("  Config version: {}", CURRENT_CONFIG_VERSION);
    println!("  Content dates: {} ({} active, {} relative)", catalog.content_dates.len(), active, relative);
    println!("  Schedules: {}", catalog.schedules.len());
    println!("  User dates: {} ({} gated)", catalog.user_dates.len(), gated);

    if let Some(cutoff) = catalog.resolver.cutoff {
        println!("  Relative cutoff: {}", format_timestamp(&cutoff));
    }
    if let Some(end) = catalog.resolver.end {
        println!("  Relative end: {}", format_timestamp(&end));
    }
}

fn resolve(config: PathBuf, user: String, course: String, format: OutputFormat) -> Result<()> {
    let catalog = load_config(&config)
        .with_context(|| format!("Failed to load catalog from {:?}", config))?;

    let user = UserId::new(user);
    let course = CourseKey::new(course);

    if catalog.course_dates(&course).next().is_none() {
        bail!("No content dates for course {}", course);
    }

    let dates = catalog
        .learner_dates(&user, &course)
        .with_context(|| format!("Failed to resolve dates for {} in {}", user, course))?;

    let at = now();
    debug!(user = %user, course = %course, count = dates.len(), "Resolved learner dates");

    let rows: Vec<DateRow<'_>> = dates
        .iter()
        .map(|date| DateRow {
            date,
            status: status_at(date.date, at),
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Text => print_rows(&rows),
    }

    Ok(())
}

fn print_rows(rows: &[DateRow<'_>]) {
    for row in rows {
        let date = row
            .date
            .date
            .map(|d| format_timestamp(&d))
            .unwrap_or_else(|| "no date".to_string());
        let status = match row.status {
            Some(DateStatus::Past) => "past",
            Some(DateStatus::Upcoming) => "upcoming",
            None => "",
        };
        let access = if row.date.has_access { "" } else { " [gated]" };

        println!(
            "{:<24} {:<8} {:<9} {}/{}{}",
            date,
            status,
            source_label(row.date.source),
            row.date.key.location,
            row.date.key.field,
            access
        );
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "when starting");

    match args.command {
        Command::Validate { config } => validate(config),
        Command::Resolve {
            config,
            user,
            course,
            format,
        } => match resolve(config, user, course, format) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                ExitCode::from(1)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_status_at() {
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap();

        assert_eq!(status_at(Some(earlier), at), Some(DateStatus::Past));
        assert_eq!(status_at(Some(at), at), Some(DateStatus::Past));
        assert_eq!(status_at(Some(later), at), Some(DateStatus::Upcoming));
        assert_eq!(status_at(None, at), None);
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "when", "resolve", "--config", "dates.toml", "--user", "test_user", "--course",
            "course-v1:TestX+Test+2025", "--format", "json",
        ])
        .unwrap();

        match args.command {
            Command::Resolve { user, format, .. } => {
                assert_eq!(user, "test_user");
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
