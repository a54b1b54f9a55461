//! Display helpers derived from a resolved availability

use crate::models::{AttendeeRole, LiveStatus};

use super::{Availability, JoinableMode};

/// Status class plus the human label shown next to a meeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLabel {
    pub class: String,
    pub text: &'static str,
}

impl StatusLabel {
    pub fn for_state(state: &Availability) -> Self {
        if state.joinable {
            let text = match state.joinable_mode {
                JoinableMode::Available => "Available",
                JoinableMode::InProgress => "In progress",
                JoinableMode::Unavailable => "Unavailable",
                JoinableMode::Unreachable | JoinableMode::NoJoinable => "Server unreachable",
            };
            Self {
                class: format!("status_joinable_{}", state.joinable_mode.as_str()),
                text,
            }
        } else if state.not_started {
            Self {
                class: "status_notstarted".to_string(),
                text: "Not started",
            }
        } else {
            Self {
                class: "status_finished".to_string(),
                text: "Finished",
            }
        }
    }
}

impl std::fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text)
    }
}

/// Who is in a session, for the detail view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantSummary {
    pub total: u32,
    pub moderators: u32,
    pub attendees: u32,
    pub moderator_names: Vec<String>,
    pub attendee_names: Vec<String>,
}

impl ParticipantSummary {
    /// Summarise `live`, or all zeros when the mode says counts are not
    /// trustworthy.
    pub fn from_status(mode: JoinableMode, live: Option<&LiveStatus>) -> Self {
        let status = match live {
            Some(s) if s.is_reachable() => s,
            _ => return Self::default(),
        };
        if matches!(mode, JoinableMode::Unreachable | JoinableMode::Unavailable) {
            return Self::default();
        }

        let mut summary = Self {
            total: status.participant_count,
            moderators: status.moderator_count,
            attendees: status.participant_count.saturating_sub(status.moderator_count),
            ..Default::default()
        };
        for attendee in &status.attendees {
            match attendee.role {
                AttendeeRole::Moderator => summary.moderator_names.push(attendee.full_name.clone()),
                AttendeeRole::Viewer => summary.attendee_names.push(attendee.full_name.clone()),
                AttendeeRole::Unknown => {}
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attendee, ReturnCode};

    fn state(joinable: bool, not_started: bool, mode: JoinableMode) -> Availability {
        Availability {
            not_started,
            finished: !joinable && !not_started,
            joinable,
            joinable_mode: mode,
            can_edit: false,
            can_delete: false,
            can_end: false,
            show_join_link: false,
            show_end_control: false,
            participant_count: 0,
            moderator_count: 0,
            running: false,
            has_been_forcibly_ended: false,
            unreachable_server: false,
        }
    }

    #[test]
    fn test_labels() {
        let l = StatusLabel::for_state(&state(true, false, JoinableMode::InProgress));
        assert_eq!(l.class, "status_joinable_inprogress");
        assert_eq!(l.text, "In progress");

        let l = StatusLabel::for_state(&state(true, false, JoinableMode::Unreachable));
        assert_eq!(l.class, "status_joinable_unreachable");
        assert_eq!(l.to_string(), "Server unreachable");

        let l = StatusLabel::for_state(&state(false, true, JoinableMode::NoJoinable));
        assert_eq!(l.class, "status_notstarted");

        let l = StatusLabel::for_state(&state(false, false, JoinableMode::NoJoinable));
        assert_eq!(l.class, "status_finished");
        assert_eq!(l.text, "Finished");
    }

    #[test]
    fn test_summary_splits_roles() {
        let live = LiveStatus {
            returncode: ReturnCode::Success,
            participant_count: 3,
            moderator_count: 1,
            attendees: vec![
                Attendee {
                    user_id: None,
                    full_name: "Ada".into(),
                    role: AttendeeRole::Moderator,
                },
                Attendee {
                    user_id: None,
                    full_name: "Alan".into(),
                    role: AttendeeRole::Viewer,
                },
            ],
            ..Default::default()
        };
        let s = ParticipantSummary::from_status(JoinableMode::InProgress, Some(&live));
        assert_eq!(s.total, 3);
        assert_eq!(s.attendees, 2);
        assert_eq!(s.moderator_names, vec!["Ada".to_string()]);
        assert_eq!(s.attendee_names, vec!["Alan".to_string()]);

        let s = ParticipantSummary::from_status(JoinableMode::Unavailable, Some(&live));
        assert_eq!(s, ParticipantSummary::default());
    }

    #[test]
    fn test_summary_missing_status() {
        let s = ParticipantSummary::from_status(JoinableMode::Unreachable, None);
        assert_eq!(s.total, 0);
        assert!(s.moderator_names.is_empty());
    }
}
