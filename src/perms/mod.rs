//! Capability records built from granted permission tokens
//!
//! The backend hands out permission strings such as `bbb.edit.any`. They map
//! onto a fixed set of named flags; anything unrecognised is ignored.

mod recording;
mod site;

pub use recording::RecordingAccess;
pub use site::{all_site_members_can_participate, parse_site_permissions, RolePermissions};

use serde_json::Value;

/// Capability flags for the current user (or for one site role).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Permissions {
    pub bbb_admin: bool,
    pub bbb_create: bool,
    pub bbb_edit_own: bool,
    pub bbb_edit_any: bool,
    pub bbb_delete_own: bool,
    pub bbb_delete_any: bool,
    pub bbb_participate: bool,
    /// Implied by any edit, delete or participate grant.
    pub bbb_view_meeting_list: bool,
    pub bbb_recording_view: bool,
    pub bbb_recording_edit_own: bool,
    pub bbb_recording_edit_any: bool,
    pub bbb_recording_delete_own: bool,
    pub bbb_recording_delete_any: bool,
    pub bbb_recording_extended_formats_own: bool,
    pub bbb_recording_extended_formats_any: bool,
    pub site_update: bool,
    pub site_view_roster: bool,
    pub calendar_new: bool,
    pub calendar_revise_own: bool,
    pub calendar_revise_any: bool,
    pub calendar_delete_own: bool,
    pub calendar_delete_any: bool,
}

/// Tool permission tokens an administrator can grant per role.
pub const TOOL_TOKENS: &[&str] = &[
    "bbb.create",
    "bbb.edit.own",
    "bbb.edit.any",
    "bbb.delete.own",
    "bbb.delete.any",
    "bbb.participate",
    "bbb.recording.view",
    "bbb.recording.edit.own",
    "bbb.recording.edit.any",
    "bbb.recording.delete.own",
    "bbb.recording.delete.any",
    "bbb.recording.extendedformats.own",
    "bbb.recording.extendedformats.any",
];

impl Permissions {
    /// Build from a list of granted tokens. Unknown tokens are skipped.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut perms = Self::default();
        for token in tokens {
            if !perms.grant(token.as_ref()) {
                tracing::debug!("Ignoring unknown permission token {}", token.as_ref());
            }
        }
        perms
    }

    /// Build from a permission payload: either a flat array of tokens or the
    /// newer `{ "data": [...] }` wrapper. Any other shape grants nothing.
    pub fn from_value(value: &Value) -> Self {
        let list = match value {
            Value::Array(items) => Some(items),
            Value::Object(map) => map.get("data").and_then(Value::as_array),
            _ => None,
        };
        match list {
            Some(items) => Self::from_tokens(items.iter().filter_map(Value::as_str)),
            None => Self::default(),
        }
    }

    /// Set the flag for one token. Returns false when the token is unknown.
    pub fn grant(&mut self, token: &str) -> bool {
        match token {
            "bbb.admin" => self.bbb_admin = true,
            "bbb.create" => self.bbb_create = true,
            "bbb.edit.own" => {
                self.bbb_edit_own = true;
                self.bbb_view_meeting_list = true;
            }
            "bbb.edit.any" => {
                self.bbb_edit_any = true;
                self.bbb_view_meeting_list = true;
            }
            "bbb.delete.own" => {
                self.bbb_delete_own = true;
                self.bbb_view_meeting_list = true;
            }
            "bbb.delete.any" => {
                self.bbb_delete_any = true;
                self.bbb_view_meeting_list = true;
            }
            "bbb.participate" => {
                self.bbb_participate = true;
                self.bbb_view_meeting_list = true;
            }
            "bbb.recording.view" => self.bbb_recording_view = true,
            "bbb.recording.edit.own" => self.bbb_recording_edit_own = true,
            "bbb.recording.edit.any" => self.bbb_recording_edit_any = true,
            "bbb.recording.delete.own" => self.bbb_recording_delete_own = true,
            "bbb.recording.delete.any" => self.bbb_recording_delete_any = true,
            "bbb.recording.extendedformats.own" => self.bbb_recording_extended_formats_own = true,
            "bbb.recording.extendedformats.any" => self.bbb_recording_extended_formats_any = true,
            "site.upd" => self.site_update = true,
            "site.viewRoster" => self.site_view_roster = true,
            "calendar.new" => self.calendar_new = true,
            "calendar.revise.own" => self.calendar_revise_own = true,
            "calendar.revise.any" => self.calendar_revise_any = true,
            "calendar.delete.own" => self.calendar_delete_own = true,
            "calendar.delete.any" => self.calendar_delete_any = true,
            _ => return false,
        }
        true
    }

    /// Whether the tool token is set in this record.
    pub fn has(&self, token: &str) -> bool {
        match token {
            "bbb.admin" => self.bbb_admin,
            "bbb.create" => self.bbb_create,
            "bbb.edit.own" => self.bbb_edit_own,
            "bbb.edit.any" => self.bbb_edit_any,
            "bbb.delete.own" => self.bbb_delete_own,
            "bbb.delete.any" => self.bbb_delete_any,
            "bbb.participate" => self.bbb_participate,
            "bbb.recording.view" => self.bbb_recording_view,
            "bbb.recording.edit.own" => self.bbb_recording_edit_own,
            "bbb.recording.edit.any" => self.bbb_recording_edit_any,
            "bbb.recording.delete.own" => self.bbb_recording_delete_own,
            "bbb.recording.delete.any" => self.bbb_recording_delete_any,
            "bbb.recording.extendedformats.own" => self.bbb_recording_extended_formats_own,
            "bbb.recording.extendedformats.any" => self.bbb_recording_extended_formats_any,
            "site.upd" => self.site_update,
            "site.viewRoster" => self.site_view_roster,
            "calendar.new" => self.calendar_new,
            "calendar.revise.own" => self.calendar_revise_own,
            "calendar.revise.any" => self.calendar_revise_any,
            "calendar.delete.own" => self.calendar_delete_own,
            "calendar.delete.any" => self.calendar_delete_any,
            _ => false,
        }
    }

    /// Recordings navigation is offered to admins and recording viewers,
    /// and only while recording is enabled site-wide.
    pub fn shows_recordings(&self, recording_enabled: bool) -> bool {
        (self.bbb_admin || self.bbb_recording_view) && recording_enabled
    }

    pub fn shows_permissions(&self) -> bool {
        self.bbb_admin
    }

    pub fn shows_end_all(&self) -> bool {
        self.bbb_delete_any
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_edit_any_delete_own() {
        let p = Permissions::from_tokens(["bbb.edit.any", "bbb.delete.own"]);
        assert!(p.bbb_edit_any);
        assert!(p.bbb_delete_own);
        assert!(!p.bbb_edit_own);
        assert!(!p.bbb_delete_any);
        assert!(!p.bbb_admin);
        assert!(!p.bbb_create);
        assert!(!p.bbb_recording_view);
        let expected = Permissions {
            bbb_edit_any: true,
            bbb_delete_own: true,
            bbb_view_meeting_list: true,
            ..Default::default()
        };
        assert_eq!(p, expected);
    }

    #[test]
    fn test_unknown_tokens_ignored() {
        let p = Permissions::from_tokens(["bbb.fly", "", "bbb_edit_any", "site.upd"]);
        assert_eq!(
            p,
            Permissions {
                site_update: true,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_view_list_implied() {
        assert!(Permissions::from_tokens(["bbb.participate"]).bbb_view_meeting_list);
        assert!(!Permissions::from_tokens(["bbb.create"]).bbb_view_meeting_list);
        assert!(!Permissions::from_tokens(["bbb.admin"]).bbb_view_meeting_list);
    }

    #[test]
    fn test_from_value_shapes() {
        let flat = Permissions::from_value(&json!(["bbb.create", "bbb.admin"]));
        let nested = Permissions::from_value(&json!({"data": ["bbb.create", "bbb.admin"]}));
        assert_eq!(flat, nested);
        assert!(flat.bbb_create && flat.bbb_admin);

        assert_eq!(Permissions::from_value(&json!(null)), Permissions::default());
        assert_eq!(Permissions::from_value(&json!({"x": 1})), Permissions::default());
        assert_eq!(
            Permissions::from_value(&json!([1, "bbb.create", null])),
            Permissions {
                bbb_create: true,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_has_matches_grant() {
        for token in TOOL_TOKENS {
            let p = Permissions::from_tokens([*token]);
            assert!(p.has(token), "{} not reported", token);
        }
        assert!(!Permissions::default().has("bbb.unknown"));
    }

    #[test]
    fn test_navigation_visibility() {
        let viewer = Permissions::from_tokens(["bbb.recording.view"]);
        assert!(viewer.shows_recordings(true));
        assert!(!viewer.shows_recordings(false));
        assert!(!viewer.shows_permissions());

        let admin = Permissions::from_tokens(["bbb.admin", "bbb.delete.any"]);
        assert!(admin.shows_recordings(true));
        assert!(admin.shows_permissions());
        assert!(admin.shows_end_all());
    }
}
