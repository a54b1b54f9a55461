//! Bundled tool settings returned by `getSettings.json`

use serde::Deserialize;

use super::flex;

/// Fallback for `descriptionMaxLength` when the server omits it.
pub const DEFAULT_DESCRIPTION_MAX_LENGTH: u32 = 2083;

fn default_description_max_length() -> u32 {
    DEFAULT_DESCRIPTION_MAX_LENGTH
}

/// The signed-in user as seen by the tool.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: String,
    pub display_id: Option<String>,
    #[serde(default)]
    pub display_name: String,
    pub eid: Option<String>,
    pub email: Option<String>,
    /// Site role of the user.
    pub role: Option<String>,
    /// Granted permission tokens; flat list or `{ "data": [...] }`.
    #[serde(default)]
    pub permissions: serde_json::Value,
}

/// Autorefresh intervals in milliseconds; zero disables polling.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AutorefreshInterval {
    #[serde(default, deserialize_with = "flex::u64_or_zero")]
    pub meetings: u64,
    #[serde(default, deserialize_with = "flex::u64_or_zero")]
    pub recordings: u64,
}

/// Site-wide switches for the add/update meeting form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormParameters {
    #[serde(default, deserialize_with = "flex::bool_or_false")]
    pub recording_enabled: bool,
    #[serde(default, deserialize_with = "flex::bool_or_false")]
    pub recording_editable: bool,
    #[serde(default, deserialize_with = "flex::bool_or_false")]
    pub recording_default: bool,
    #[serde(default, deserialize_with = "flex::bool_or_false")]
    pub duration_enabled: bool,
    #[serde(default, deserialize_with = "flex::u64_or_zero")]
    pub duration_default: u64,
    #[serde(default, deserialize_with = "flex::bool_or_false")]
    pub waitmoderator_enabled: bool,
    #[serde(default, deserialize_with = "flex::bool_or_false")]
    pub waitmoderator_editable: bool,
    #[serde(default, deserialize_with = "flex::bool_or_false")]
    pub waitmoderator_default: bool,
    #[serde(default, deserialize_with = "flex::bool_or_false")]
    pub multiplesessionsallowed_enabled: bool,
    #[serde(default, deserialize_with = "flex::bool_or_false")]
    pub multiplesessionsallowed_editable: bool,
    #[serde(default, deserialize_with = "flex::bool_or_false")]
    pub multiplesessionsallowed_default: bool,
    #[serde(default, deserialize_with = "flex::bool_or_false")]
    pub preuploadpresentation_enabled: bool,
    #[serde(default, deserialize_with = "flex::bool_or_false")]
    pub groupsessions_enabled: bool,
    #[serde(default, deserialize_with = "flex::bool_or_false")]
    pub groupsessions_editable: bool,
    #[serde(default, deserialize_with = "flex::bool_or_false")]
    pub groupsessions_default: bool,
    #[serde(
        default = "default_description_max_length",
        deserialize_with = "flex::u32_or_zero"
    )]
    pub description_max_length: u32,
    pub description_type: Option<String>,
}

impl Default for FormParameters {
    fn default() -> Self {
        Self {
            recording_enabled: false,
            recording_editable: false,
            recording_default: false,
            duration_enabled: false,
            duration_default: 0,
            waitmoderator_enabled: false,
            waitmoderator_editable: false,
            waitmoderator_default: false,
            multiplesessionsallowed_enabled: false,
            multiplesessionsallowed_editable: false,
            multiplesessionsallowed_default: false,
            preuploadpresentation_enabled: false,
            groupsessions_enabled: false,
            groupsessions_editable: false,
            groupsessions_default: false,
            description_max_length: DEFAULT_DESCRIPTION_MAX_LENGTH,
            description_type: None,
        }
    }
}

/// Server clock snapshot taken when settings were produced.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerTime {
    #[serde(default, deserialize_with = "flex::i64_or_zero")]
    pub timestamp: i64,
    pub timezone: Option<String>,
    #[serde(rename = "timezoneID")]
    pub timezone_id: Option<String>,
    #[serde(default, deserialize_with = "flex::i64_or_zero")]
    pub timezone_offset: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    #[serde(default)]
    pub autorefresh_interval: AutorefreshInterval,
    #[serde(default)]
    pub add_update_form_parameters: FormParameters,
    #[serde(default)]
    pub server_time_in_default_timezone: ServerTime,
    #[serde(default, deserialize_with = "flex::bool_or_false")]
    pub recording_format_filter_enabled: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub current_user: Option<CurrentUser>,
    #[serde(default)]
    pub config: ToolConfig,
    pub tool_version: Option<serde_json::Value>,
}
