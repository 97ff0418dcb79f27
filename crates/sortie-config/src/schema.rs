//! Raw schedule schema (as parsed from TOML or a JSON session record)

use serde::{Deserialize, Serialize};

/// Raw schedule file as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Board-level settings
    #[serde(default)]
    pub board: RawBoardConfig,

    /// Scheduled sessions
    #[serde(default)]
    pub sessions: Vec<RawSession>,
}

/// Board-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawBoardConfig {
    /// Seconds between status refreshes in watch mode (default: 60)
    pub poll_interval_seconds: Option<u64>,

    /// Closing minutes for sessions that don't set their own (default: 60)
    pub default_closing_minutes: Option<i64>,
}

/// Raw session record.
///
/// Accepts every historical shape: snake_case or camelCase keys, a single
/// legacy `time` instead of separate start fields, and a free-form `name`
/// with no code at all. A cached `status` is tolerated and ignored.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawSession {
    /// Unique stable ID
    pub id: String,

    /// Dispatcher session code
    #[serde(default, alias = "sessionCode", skip_serializing_if = "Option::is_none")]
    pub session_code: Option<String>,

    /// Legacy display name; any text, never treated as a code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Session date (YYYY-MM-DD)
    pub date: String,

    /// Registration opens (HH:MM)
    #[serde(
        default,
        alias = "registrationStartTime",
        skip_serializing_if = "Option::is_none"
    )]
    pub registration_start_time: Option<String>,

    /// Session starts (HH:MM)
    #[serde(default, alias = "startTime", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,

    /// Session ends (HH:MM); absent means two hours after start
    #[serde(default, alias = "endTime", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,

    /// Oldest shape: one time for both registration start and start
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,

    /// Minutes before start at which registration closes
    #[serde(default, alias = "closingMinutes", skip_serializing_if = "Option::is_none")]
    pub closing_minutes: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,

    /// Status cached by older writers; never trusted
    #[serde(default, skip_serializing)]
    pub status: Option<String>,
}

impl RawSession {
    /// Dispatcher code, if the record has one
    pub fn code(&self) -> Option<&str> {
        non_empty(&self.session_code)
    }

    /// Display name, if the record has one
    pub fn title(&self) -> Option<&str> {
        non_empty(&self.name)
    }
}

/// Treat missing, empty and whitespace-only strings alike
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_current_shape() {
        let toml_str = r#"
            config_version = 1

            [board]
            poll_interval_seconds = 30

            [[sessions]]
            id = "s1"
            session_code = "ABC"
            date = "2025-03-10"
            registration_start_time = "08:00"
            start_time = "10:00"
            end_time = "12:00"
            closing_minutes = 60
        "#;

        let config: RawConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.sessions.len(), 1);
        assert_eq!(config.board.poll_interval_seconds, Some(30));
        assert_eq!(config.sessions[0].start_time.as_deref(), Some("10:00"));
    }

    #[test]
    fn parse_camel_case_record() {
        let json = r#"{
            "id": "k2x9",
            "sessionCode": "QWE",
            "date": "2025-03-10",
            "registrationStartTime": "08:00",
            "startTime": "10:00",
            "closingMinutes": 45,
            "status": "open"
        }"#;

        let raw: RawSession = serde_json::from_str(json).unwrap();
        assert_eq!(raw.session_code.as_deref(), Some("QWE"));
        assert_eq!(raw.registration_start_time.as_deref(), Some("08:00"));
        assert_eq!(raw.closing_minutes, Some(45));
        assert!(raw.end_time.is_none());
    }

    #[test]
    fn parse_oldest_shape() {
        let json = r#"{
            "id": "a1",
            "name": "Проверка техники пилотирования",
            "date": "2025-03-10",
            "time": "14:00",
            "status": "closed",
            "closingMinutes": 60,
            "createdAt": "2025-03-01T10:00:00.000Z"
        }"#;

        let raw: RawSession = serde_json::from_str(json).unwrap();
        assert_eq!(raw.time.as_deref(), Some("14:00"));
        assert_eq!(raw.code(), None);
        assert_eq!(raw.title(), Some("Проверка техники пилотирования"));
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let raw = RawSession {
            session_code: Some("  ".into()),
            name: Some("XYZ".into()),
            ..Default::default()
        };
        assert_eq!(raw.code(), None);
        assert_eq!(raw.title(), Some("XYZ"));
    }

    #[test]
    fn cached_status_is_not_written_back() {
        let raw = RawSession {
            id: "s1".into(),
            date: "2025-03-10".into(),
            status: Some("open".into()),
            ..Default::default()
        };
        let out = toml::to_string(&raw).unwrap();
        assert!(!out.contains("status"));
        assert!(!out.contains("end_time"));
    }
}
