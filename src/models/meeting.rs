//! Meeting and participant models

use serde::{Deserialize, Serialize};

use super::flex;

/// How a participant entry selects site members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionType {
    All,
    User,
    Group,
    Role,
    #[serde(other)]
    Unknown,
}

impl SelectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionType::All => "all",
            SelectionType::User => "user",
            SelectionType::Group => "group",
            SelectionType::Role => "role",
            SelectionType::Unknown => "unknown",
        }
    }
}

/// Role granted to the members a participant entry selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Attendee,
    Moderator,
}

impl ParticipantRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantRole::Attendee => "attendee",
            ParticipantRole::Moderator => "moderator",
        }
    }
}

/// Participant selection entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub selection_type: SelectionType,
    #[serde(default)]
    pub selection_id: String,
    pub role: ParticipantRole,
}

impl Participant {
    pub fn new(selection_type: SelectionType, selection_id: &str, role: ParticipantRole) -> Self {
        Self {
            selection_type,
            selection_id: selection_id.to_string(),
            role,
        }
    }
}

/// Free-form meeting properties
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingProps {
    pub welcome_message: Option<String>,
}

/// A scheduled conferencing session as stored by the backend.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub site_id: Option<String>,
    #[serde(default)]
    pub owner_id: String,
    pub owner_display_name: Option<String>,
    /// Epoch milliseconds; absent or zero means unbounded.
    #[serde(default, deserialize_with = "flex::opt_i64")]
    pub start_date: Option<i64>,
    /// Epoch milliseconds; absent or zero means unbounded.
    #[serde(default, deserialize_with = "flex::opt_i64")]
    pub end_date: Option<i64>,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default, deserialize_with = "flex::bool_or_false")]
    pub multiple_sessions_allowed: bool,
    #[serde(default, deserialize_with = "flex::bool_or_false")]
    pub recording: bool,
    #[serde(default, deserialize_with = "flex::opt_i64")]
    pub recording_duration: Option<i64>,
    #[serde(default, deserialize_with = "flex::bool_or_false")]
    pub group_sessions: bool,
    #[serde(default, deserialize_with = "flex::bool_or_false")]
    pub wait_for_moderator: bool,
    pub presentation: Option<String>,
    pub join_url: Option<String>,
    pub props: Option<MeetingProps>,
}

impl Meeting {
    /// Start bound with zero normalised to unbounded.
    pub fn start_bound(&self) -> Option<i64> {
        self.start_date.filter(|&ms| ms != 0)
    }

    /// End bound with zero normalised to unbounded.
    pub fn end_bound(&self) -> Option<i64> {
        self.end_date.filter(|&ms| ms != 0)
    }

    pub fn welcome_message(&self) -> Option<&str> {
        self.props
            .as_ref()
            .and_then(|p| p.welcome_message.as_deref())
    }

    pub fn moderator_entries(&self) -> usize {
        self.participants
            .iter()
            .filter(|p| p.role == ParticipantRole::Moderator)
            .count()
    }

    /// Participant entry that applies to a user: an explicit user selection
    /// wins over a role selection, which wins over an `all` selection.
    pub fn participant_for(&self, user_id: &str, site_role: Option<&str>) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| p.selection_type == SelectionType::User && p.selection_id == user_id)
            .or_else(|| {
                site_role.and_then(|role| {
                    self.participants
                        .iter()
                        .find(|p| p.selection_type == SelectionType::Role && p.selection_id == role)
                })
            })
            .or_else(|| {
                self.participants
                    .iter()
                    .find(|p| p.selection_type == SelectionType::All)
            })
    }
}

/// Collection wrapper returned by `bbb-tool.json`.
#[derive(Debug, Default, Deserialize)]
pub struct MeetingCollection {
    #[serde(rename = "bbb-tool_collection", default)]
    pub meetings: Option<Vec<Meeting>>,
}
