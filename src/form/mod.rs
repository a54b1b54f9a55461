//! Meeting create/update form
//!
//! Validation collects every problem before anything is sent, so a rejected
//! form never produces a network call.

use std::str::FromStr;

use thiserror::Error;

use crate::models::{FormParameters, Meeting, Participant, ParticipantRole, SelectionType};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Meeting title is required")]
    EmptyTitle,
    #[error("At least one participant is required")]
    NoParticipants,
    #[error("Start date must differ from end date")]
    StartEqualsEnd,
    #[error("Start date must be before end date")]
    StartAfterEnd,
    #[error("Description is too long ({actual} characters, maximum is {max})")]
    DescriptionTooLong { max: u32, actual: usize },
    #[error("Invalid participant '{0}', expected all:<role>, user:<id>:<role>, group:<id>:<role> or role:<id>:<role>")]
    InvalidParticipant(String),
    #[error("Invalid date '{0}', expected YYYY-MM-DD HH:MM")]
    InvalidDate(String),
    #[error("The {0} option is not enabled in this site")]
    OptionDisabled(&'static str),
    #[error("The {0} option cannot be changed in this site")]
    OptionLocked(&'static str),
}

/// Changes requested on the command line, applied over a blank or
/// existing form. `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct FormEdits {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub clear_start: bool,
    pub clear_end: bool,
    /// Replaces the participant list when non-empty.
    pub participants: Vec<String>,
    pub recording: Option<bool>,
    pub recording_duration: Option<i64>,
    pub wait_for_moderator: Option<bool>,
    pub multiple_sessions_allowed: Option<bool>,
    pub group_sessions: Option<bool>,
    pub add_to_calendar: bool,
    pub notify_participants: bool,
    pub presentation: Option<String>,
}

impl FormEdits {
    /// Apply onto `form`. Dates are read in the server timezone. Options the
    /// site disables or locks keep their current value; asking to change
    /// one is an error.
    pub fn apply(
        self,
        form: &mut MeetingForm,
        params: &FormParameters,
        tz_offset_ms: i64,
    ) -> Result<(), FormError> {
        if let Some(name) = self.name {
            form.name = name;
        }
        if let Some(description) = self.description {
            form.welcome_message = description;
        }
        if self.clear_start {
            form.start_ms = None;
        }
        if let Some(start) = self.start {
            form.start_ms = Some(parse_server_datetime(&start, tz_offset_ms)?);
        }
        if self.clear_end {
            form.end_ms = None;
        }
        if let Some(end) = self.end {
            form.end_ms = Some(parse_server_datetime(&end, tz_offset_ms)?);
        }
        if !self.participants.is_empty() {
            form.participants = self
                .participants
                .iter()
                .map(|p| parse_participant(p))
                .collect::<Result<_, _>>()?;
        }
        set_switch(
            "recording",
            self.recording,
            &mut form.recording,
            params.recording_enabled,
            params.recording_editable,
        )?;
        set_switch(
            "wait for moderator",
            self.wait_for_moderator,
            &mut form.wait_for_moderator,
            params.waitmoderator_enabled,
            params.waitmoderator_editable,
        )?;
        set_switch(
            "multiple sessions",
            self.multiple_sessions_allowed,
            &mut form.multiple_sessions_allowed,
            params.multiplesessionsallowed_enabled,
            params.multiplesessionsallowed_editable,
        )?;
        set_switch(
            "group sessions",
            self.group_sessions,
            &mut form.group_sessions,
            params.groupsessions_enabled,
            params.groupsessions_editable,
        )?;
        if let Some(duration) = self.recording_duration {
            let duration = (duration > 0).then_some(duration);
            if duration != form.recording_duration && !params.duration_enabled {
                return Err(FormError::OptionDisabled("recording duration"));
            }
            form.recording_duration = duration;
        }
        form.add_to_calendar = self.add_to_calendar;
        form.notify_participants = self.notify_participants;
        if let Some(url) = self.presentation {
            let url = (!url.is_empty()).then_some(url);
            if url != form.presentation && !params.preuploadpresentation_enabled {
                return Err(FormError::OptionDisabled("presentation"));
            }
            form.presentation = url;
        }
        Ok(())
    }
}

/// Change a site-controlled boolean option, if the site allows it.
fn set_switch(
    name: &'static str,
    requested: Option<bool>,
    current: &mut bool,
    enabled: bool,
    editable: bool,
) -> Result<(), FormError> {
    let Some(value) = requested.filter(|v| *v != *current) else {
        return Ok(());
    };
    if !enabled {
        return Err(FormError::OptionDisabled(name));
    }
    if !editable {
        return Err(FormError::OptionLocked(name));
    }
    *current = value;
    Ok(())
}

/// Parse `YYYY-MM-DD HH:MM` wall time at the given UTC offset into epoch ms.
pub fn parse_server_datetime(s: &str, tz_offset_ms: i64) -> Result<i64, FormError> {
    let naive = chrono::NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M")
        .map_err(|_| FormError::InvalidDate(s.to_string()))?;
    Ok(naive.and_utc().timestamp_millis() - tz_offset_ms)
}

/// Editable fields of a meeting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeetingForm {
    pub name: String,
    pub welcome_message: String,
    pub start_ms: Option<i64>,
    pub end_ms: Option<i64>,
    pub participants: Vec<Participant>,
    pub recording: bool,
    pub recording_duration: Option<i64>,
    pub wait_for_moderator: bool,
    pub multiple_sessions_allowed: bool,
    pub group_sessions: bool,
    pub add_to_calendar: bool,
    pub notify_participants: bool,
    pub presentation: Option<String>,
}

impl MeetingForm {
    /// Blank form seeded with the site defaults. Everyone attends.
    pub fn new(params: &FormParameters) -> Self {
        Self {
            participants: vec![Participant::new(
                SelectionType::All,
                "all",
                ParticipantRole::Attendee,
            )],
            recording: params.recording_enabled && params.recording_default,
            wait_for_moderator: params.waitmoderator_enabled && params.waitmoderator_default,
            multiple_sessions_allowed: params.multiplesessionsallowed_enabled
                && params.multiplesessionsallowed_default,
            group_sessions: params.groupsessions_enabled && params.groupsessions_default,
            recording_duration: (params.duration_enabled && params.duration_default > 0)
                .then_some(params.duration_default as i64),
            ..Default::default()
        }
    }

    /// Form pre-filled from an existing meeting, for editing.
    pub fn from_meeting(meeting: &Meeting) -> Self {
        Self {
            name: meeting.name.clone(),
            welcome_message: meeting.welcome_message().unwrap_or_default().to_string(),
            start_ms: meeting.start_bound(),
            end_ms: meeting.end_bound(),
            participants: meeting.participants.clone(),
            recording: meeting.recording,
            recording_duration: meeting.recording_duration,
            wait_for_moderator: meeting.wait_for_moderator,
            multiple_sessions_allowed: meeting.multiple_sessions_allowed,
            group_sessions: meeting.group_sessions,
            add_to_calendar: false,
            notify_participants: false,
            presentation: meeting.presentation.clone(),
        }
    }

    /// Check the form, returning every problem found.
    pub fn validate(&self, description_max_length: u32) -> Result<(), Vec<FormError>> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(FormError::EmptyTitle);
        }
        if self.participants.is_empty() {
            errors.push(FormError::NoParticipants);
        }
        if let (Some(start), Some(end)) = (self.start_ms, self.end_ms) {
            if end == start {
                errors.push(FormError::StartEqualsEnd);
            } else if end < start {
                errors.push(FormError::StartAfterEnd);
            }
        }
        let actual = self.welcome_message.chars().count();
        if actual > description_max_length as usize {
            errors.push(FormError::DescriptionTooLong {
                max: description_max_length,
                actual,
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Form-encoded body for the create and edit endpoints.
    pub fn to_form_pairs(&self, site_id: &str) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("name".to_string(), self.name.trim().to_string()),
            ("siteId".to_string(), site_id.to_string()),
            ("props.welcomeMessage".to_string(), self.welcome_message.clone()),
        ];
        // Calendar entries need a start date.
        pairs.push(flag("addToCalendar", self.add_to_calendar && self.start_ms.is_some()));
        if let Some(start) = self.start_ms {
            pairs.push(("startDate".to_string(), start.to_string()));
        }
        if let Some(end) = self.end_ms {
            pairs.push(("endDate".to_string(), end.to_string()));
        }
        pairs.push(flag("recording", self.recording));
        if let Some(duration) = self.recording_duration {
            pairs.push(("recordingDuration".to_string(), duration.to_string()));
        }
        pairs.push(flag("waitForModerator", self.wait_for_moderator));
        pairs.push(flag("multipleSessionsAllowed", self.multiple_sessions_allowed));
        pairs.push(flag("groupSessions", self.group_sessions));
        pairs.push(flag("notifyParticipants", self.notify_participants));
        if let Some(url) = &self.presentation {
            pairs.push(("presentation".to_string(), url.clone()));
        }

        for p in &self.participants {
            let kind = p.selection_type.as_str();
            let id = match p.selection_type {
                SelectionType::All => "all",
                _ => p.selection_id.as_str(),
            };
            pairs.push((format!("{}_{}", kind, id), id.to_string()));
            pairs.push((format!("{}-role_{}", kind, id), p.role.as_str().to_string()));
        }
        pairs
    }
}

fn flag(key: &str, value: bool) -> (String, String) {
    (key.to_string(), value.to_string())
}

/// Parse a participant from the command line.
pub fn parse_participant(s: &str) -> Result<Participant, FormError> {
    let invalid = || FormError::InvalidParticipant(s.to_string());
    let parts: Vec<&str> = s.split(':').collect();
    let role = |r: &str| ParticipantRole::from_str(r).map_err(|_| invalid());

    match parts.as_slice() {
        ["all", r] => Ok(Participant::new(SelectionType::All, "all", role(r)?)),
        [kind, id, r] if !id.is_empty() => {
            let selection_type = match *kind {
                "user" => SelectionType::User,
                "group" => SelectionType::Group,
                "role" => SelectionType::Role,
                _ => return Err(invalid()),
            };
            Ok(Participant::new(selection_type, id, role(r)?))
        }
        _ => Err(invalid()),
    }
}

impl FromStr for ParticipantRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "attendee" => Ok(ParticipantRole::Attendee),
            "moderator" => Ok(ParticipantRole::Moderator),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> MeetingForm {
        MeetingForm {
            name: "Weekly sync".into(),
            participants: vec![Participant::new(
                SelectionType::All,
                "all",
                ParticipantRole::Attendee,
            )],
            ..Default::default()
        }
    }

    fn value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
        pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_valid_form() {
        assert_eq!(valid().validate(2083), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let form = MeetingForm {
            name: "   ".into(),
            participants: vec![],
            start_ms: Some(5_000),
            end_ms: Some(1_000),
            welcome_message: "x".repeat(11),
            ..Default::default()
        };
        let errors = form.validate(10).unwrap_err();
        assert_eq!(
            errors,
            vec![
                FormError::EmptyTitle,
                FormError::NoParticipants,
                FormError::StartAfterEnd,
                FormError::DescriptionTooLong { max: 10, actual: 11 },
            ]
        );
    }

    #[test]
    fn test_equal_dates() {
        let form = MeetingForm {
            start_ms: Some(1_000),
            end_ms: Some(1_000),
            ..valid()
        };
        assert_eq!(form.validate(2083), Err(vec![FormError::StartEqualsEnd]));

        let only_start = MeetingForm {
            start_ms: Some(1_000),
            ..valid()
        };
        assert!(only_start.validate(2083).is_ok());
    }

    #[test]
    fn test_description_limit_counts_chars() {
        let form = MeetingForm {
            welcome_message: "é".repeat(5),
            ..valid()
        };
        assert!(form.validate(5).is_ok());
    }

    #[test]
    fn test_form_pairs() {
        let form = MeetingForm {
            start_ms: Some(1_000),
            recording: true,
            participants: vec![
                Participant::new(SelectionType::All, "all", ParticipantRole::Attendee),
                Participant::new(SelectionType::User, "u-7", ParticipantRole::Moderator),
            ],
            ..valid()
        };
        let pairs = form.to_form_pairs("site-1");
        assert_eq!(value(&pairs, "name"), Some("Weekly sync"));
        assert_eq!(value(&pairs, "siteId"), Some("site-1"));
        assert_eq!(value(&pairs, "startDate"), Some("1000"));
        assert_eq!(value(&pairs, "endDate"), None);
        assert_eq!(value(&pairs, "recording"), Some("true"));
        assert_eq!(value(&pairs, "groupSessions"), Some("false"));
        assert_eq!(value(&pairs, "all_all"), Some("all"));
        assert_eq!(value(&pairs, "all-role_all"), Some("attendee"));
        assert_eq!(value(&pairs, "user_u-7"), Some("u-7"));
        assert_eq!(value(&pairs, "user-role_u-7"), Some("moderator"));
    }

    #[test]
    fn test_calendar_needs_start() {
        let form = MeetingForm {
            add_to_calendar: true,
            ..valid()
        };
        let pairs = form.to_form_pairs("s");
        assert_eq!(value(&pairs, "addToCalendar"), Some("false"));
    }

    #[test]
    fn test_parse_participant() {
        assert_eq!(
            parse_participant("all:moderator"),
            Ok(Participant::new(SelectionType::All, "all", ParticipantRole::Moderator))
        );
        assert_eq!(
            parse_participant("group:g1:Attendee"),
            Ok(Participant::new(SelectionType::Group, "g1", ParticipantRole::Attendee))
        );
        assert!(parse_participant("user::attendee").is_err());
        assert!(parse_participant("team:x:attendee").is_err());
        assert!(parse_participant("all:owner").is_err());
    }

    #[test]
    fn test_parse_server_datetime() {
        assert_eq!(parse_server_datetime("1970-01-01 01:00", 0), Ok(3_600_000));
        // 10:00 at UTC+2 is 08:00 UTC.
        assert_eq!(
            parse_server_datetime("2024-03-01 10:00", 7_200_000),
            Ok(1_709_280_000_000)
        );
        assert!(parse_server_datetime("tomorrow", 0).is_err());
    }

    fn open_params() -> FormParameters {
        FormParameters {
            recording_enabled: true,
            recording_editable: true,
            duration_enabled: true,
            waitmoderator_enabled: true,
            waitmoderator_editable: true,
            multiplesessionsallowed_enabled: true,
            multiplesessionsallowed_editable: true,
            preuploadpresentation_enabled: true,
            groupsessions_enabled: true,
            groupsessions_editable: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_edits_apply() {
        let params = open_params();
        let mut form = valid();
        form.start_ms = Some(1);
        let edits = FormEdits {
            name: Some("Office hours".into()),
            clear_start: true,
            end: Some("1970-01-01 00:10".into()),
            participants: vec!["role:maintain:moderator".into()],
            recording: Some(true),
            recording_duration: Some(0),
            presentation: Some(String::new()),
            ..Default::default()
        };
        edits.apply(&mut form, &params, 0).unwrap();
        assert_eq!(form.name, "Office hours");
        assert_eq!(form.start_ms, None);
        assert_eq!(form.end_ms, Some(600_000));
        assert_eq!(form.participants[0].selection_type, SelectionType::Role);
        assert!(form.recording);
        assert_eq!(form.recording_duration, None);
        assert_eq!(form.presentation, None);

        let bad = FormEdits {
            participants: vec!["nobody".into()],
            ..Default::default()
        };
        assert_eq!(
            bad.apply(&mut form, &params, 0),
            Err(FormError::InvalidParticipant("nobody".into()))
        );
    }

    #[test]
    fn test_disabled_options_are_rejected() {
        let params = FormParameters::default();
        let mut form = MeetingForm::new(&params);

        let edits = FormEdits {
            recording: Some(true),
            ..Default::default()
        };
        assert_eq!(
            edits.apply(&mut form, &params, 0),
            Err(FormError::OptionDisabled("recording"))
        );
        let edits = FormEdits {
            group_sessions: Some(true),
            ..Default::default()
        };
        assert_eq!(
            edits.apply(&mut form, &params, 0),
            Err(FormError::OptionDisabled("group sessions"))
        );
        let edits = FormEdits {
            recording_duration: Some(30),
            ..Default::default()
        };
        assert_eq!(
            edits.apply(&mut form, &params, 0),
            Err(FormError::OptionDisabled("recording duration"))
        );

        let pairs = form.to_form_pairs("s");
        assert_eq!(value(&pairs, "recording"), Some("false"));
        assert_eq!(value(&pairs, "groupSessions"), Some("false"));

        // Asking for the value already set is not a change.
        let edits = FormEdits {
            recording: Some(false),
            name: Some("Sync".into()),
            ..Default::default()
        };
        assert_eq!(edits.apply(&mut form, &params, 0), Ok(()));
        assert_eq!(form.name, "Sync");
    }

    #[test]
    fn test_locked_options_keep_their_value() {
        let params = FormParameters {
            waitmoderator_editable: false,
            recording_editable: false,
            ..open_params()
        };

        // Editing a meeting keeps the stored value of a locked option.
        let meeting = Meeting {
            id: "m1".into(),
            name: "Sync".into(),
            recording: true,
            ..Default::default()
        };
        let mut form = MeetingForm::from_meeting(&meeting);
        let edits = FormEdits {
            recording: Some(false),
            ..Default::default()
        };
        assert_eq!(
            edits.apply(&mut form, &params, 0),
            Err(FormError::OptionLocked("recording"))
        );
        assert!(form.recording);

        let edits = FormEdits {
            wait_for_moderator: Some(true),
            ..Default::default()
        };
        assert_eq!(
            edits.apply(&mut form, &params, 0),
            Err(FormError::OptionLocked("wait for moderator"))
        );
        assert!(!form.wait_for_moderator);

        let edits = FormEdits {
            multiple_sessions_allowed: Some(true),
            ..Default::default()
        };
        edits.apply(&mut form, &params, 0).unwrap();
        assert!(form.multiple_sessions_allowed);
    }

    #[test]
    fn test_new_uses_site_defaults() {
        let params = FormParameters {
            recording_enabled: true,
            recording_default: true,
            multiplesessionsallowed_enabled: false,
            multiplesessionsallowed_default: true,
            ..Default::default()
        };
        let form = MeetingForm::new(&params);
        assert!(form.recording);
        assert!(!form.multiple_sessions_allowed);
        assert_eq!(form.participants.len(), 1);
    }
}
