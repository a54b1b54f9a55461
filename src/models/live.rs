//! Live session status reported by the conferencing server

use serde::Deserialize;

use super::flex;

/// Conferencing server API return code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReturnCode {
    Success,
    #[default]
    #[serde(other)]
    Failed,
}

/// Role an attendee holds inside a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttendeeRole {
    Viewer,
    Moderator,
    #[serde(other)]
    Unknown,
}

/// Someone currently present in a session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    #[serde(rename = "userID")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub full_name: String,
    pub role: AttendeeRole,
}

/// Message key the server uses for a session that was never created.
pub const MESSAGE_KEY_NOT_FOUND: &str = "notFound";

/// Response of `getMeetingInfo.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStatus {
    #[serde(default)]
    pub returncode: ReturnCode,
    pub message_key: Option<String>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    #[serde(default, deserialize_with = "flex::u32_or_zero")]
    pub participant_count: u32,
    #[serde(default, deserialize_with = "flex::u32_or_zero")]
    pub moderator_count: u32,
    #[serde(default, deserialize_with = "flex::bool_or_false")]
    pub has_been_forcibly_ended: bool,
    #[serde(default, deserialize_with = "flex::opt_bool")]
    pub running: Option<bool>,
}

impl LiveStatus {
    /// Whether the server answered meaningfully. A FAILED reply for a session
    /// that simply does not exist yet still counts as reachable.
    pub fn is_reachable(&self) -> bool {
        match self.returncode {
            ReturnCode::Success => true,
            ReturnCode::Failed => self.message_key.as_deref() == Some(MESSAGE_KEY_NOT_FOUND),
        }
    }

    /// Explicit running flag, else "somebody is there".
    pub fn is_running(&self) -> bool {
        if self.returncode != ReturnCode::Success {
            return false;
        }
        self.running.unwrap_or(!self.attendees.is_empty())
    }

    pub fn has_attendee_named(&self, display_name: &str) -> bool {
        self.attendees.iter().any(|a| a.full_name == display_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_running_status() {
        let json = r#"{
            "returncode": "SUCCESS",
            "running": "true",
            "hasBeenForciblyEnded": "false",
            "participantCount": "2",
            "moderatorCount": "1",
            "attendees": [
                {"userID": "u-1", "fullName": "Ada Lovelace", "role": "MODERATOR"},
                {"userID": "u-2", "fullName": "Alan Turing", "role": "VIEWER"}
            ]
        }"#;
        let s: LiveStatus = serde_json::from_str(json).unwrap();
        assert!(s.is_reachable());
        assert!(s.is_running());
        assert!(!s.has_been_forcibly_ended);
        assert_eq!(s.participant_count, 2);
        assert_eq!(s.moderator_count, 1);
        assert_eq!(s.attendees[1].role, AttendeeRole::Viewer);
        assert!(s.has_attendee_named("Alan Turing"));
        assert!(!s.has_attendee_named("Grace Hopper"));
    }

    #[test]
    fn test_running_falls_back_to_attendees() {
        let s: LiveStatus = serde_json::from_str(
            r#"{"returncode":"SUCCESS","attendees":[{"fullName":"X","role":"VIEWER"}]}"#,
        )
        .unwrap();
        assert_eq!(s.running, None);
        assert!(s.is_running());

        let s: LiveStatus = serde_json::from_str(r#"{"returncode":"SUCCESS"}"#).unwrap();
        assert!(!s.is_running());
    }

    #[test]
    fn test_failed_reachability() {
        let not_found: LiveStatus =
            serde_json::from_str(r#"{"returncode":"FAILED","messageKey":"notFound"}"#).unwrap();
        assert!(not_found.is_reachable());
        assert!(!not_found.is_running());

        let broken: LiveStatus =
            serde_json::from_str(r#"{"returncode":"FAILED","messageKey":"checksumError"}"#)
                .unwrap();
        assert!(!broken.is_reachable());

        let odd: LiveStatus = serde_json::from_str(r#"{"returncode":"WHATEVER"}"#).unwrap();
        assert_eq!(odd.returncode, ReturnCode::Failed);

        let empty: LiveStatus = serde_json::from_str("{}").unwrap();
        assert!(!empty.is_reachable());
    }
}
