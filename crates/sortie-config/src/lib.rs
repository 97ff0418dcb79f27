//! Schedule parsing and validation for sortie
//!
//! Supports TOML schedules with:
//! - Versioned schema
//! - Session records in any historical shape (legacy `time`, `name`, camelCase keys)
//! - Validation with clear error messages
//! - Normalization into the engine's [`sortie_api::Session`]

mod schedule;
mod schema;
mod validation;

pub use schedule::*;
pub use schema::*;
pub use validation::*;

use sortie_util::SortieError;
use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read schedule file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),

    #[error("Invalid session record: {0}")]
    Session(#[from] SortieError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Load and validate a schedule from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Schedule> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate a schedule from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Schedule> {
    let raw: RawConfig = toml::from_str(content)?;

    // Check version
    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    // Validate
    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    Ok(Schedule::from_raw(raw)?)
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

            [[sessions]]
            id = "s1"
            date = "2025-03-10"
            start_time = "10:00"
        "#;

        let schedule = parse_config(config).unwrap();
        assert_eq!(schedule.sessions.len(), 1);
        assert_eq!(schedule.sessions[0].id.as_str(), "s1");
        assert_eq!(schedule.sessions[0].closing_minutes, DEFAULT_CLOSING_MINUTES);
    }

    #[test]
    fn reject_wrong_version() {
        let config = r#"
            config_version = 99

            [[sessions]]
            id = "s1"
            date = "2025-03-10"
        "#;

        let result = parse_config(config);
        assert!(matches!(result, Err(ConfigError::UnsupportedVersion(99))));
    }

    #[test]
    fn reject_unparsable_time() {
        let config = r#"
            config_version = 1

            [[sessions]]
            id = "s1"
            date = "2025-03-10"
            start_time = "ten o'clock"
        "#;

        match parse_config(config) {
            Err(ConfigError::ValidationFailed { errors }) => assert_eq!(errors.len(), 1),
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            config_version = 1

            [board]
            poll_interval_seconds = 15
            default_closing_minutes = 20

            [[sessions]]
            id = "legacy"
            name = "Утренний брифинг"
            date = "2025-03-10"
            time = "14:00"

            [[sessions]]
            id = "legacy-2"
            name = "Утренний брифинг"
            date = "2025-03-11"
            time = "14:00"
            "#
        )
        .unwrap();

        let schedule = load_config(file.path()).unwrap();
        assert_eq!(schedule.board.poll_interval.as_secs(), 15);
        assert_eq!(schedule.sessions[0].closing_minutes, 20);
        assert!(schedule.taken_codes().is_empty());
        assert_eq!(schedule.sessions[1].title.as_deref(), Some("Утренний брифинг"));
    }

    #[test]
    fn example_schedule_is_valid() {
        let schedule = parse_config(include_str!("../../../schedule.example.toml")).unwrap();
        assert_eq!(schedule.sessions.len(), 3);
        assert_eq!(schedule.sessions[1].end_time, None);
        assert_eq!(schedule.sessions[2].closing_minutes, 15);
    }

    #[test]
    fn missing_file_is_read_error() {
        let result = load_config("/nonexistent/sortie/schedule.toml");
        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }
}
