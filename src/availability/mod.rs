//! Meeting availability resolution
//!
//! Reconciles a cached meeting record with the last polled live status and
//! derives everything the views need: the time-window state, the refined
//! joinable mode, per-user capabilities, and which controls to offer.
//!
//! Resolution is pure. A missing or failed live status never errors; it
//! degrades to `Unreachable` with zero participants.

mod status;

pub use status::{ParticipantSummary, StatusLabel};

use crate::models::{LiveStatus, Meeting};
use crate::perms::Permissions;

/// Refined availability of a meeting inside its time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinableMode {
    /// Window open, server reachable, nobody present yet.
    Available,
    /// Session is running.
    InProgress,
    /// Session was forcibly ended and cannot be rejoined.
    Unavailable,
    /// Live status could not be obtained.
    Unreachable,
    /// Outside the joinable window.
    NoJoinable,
}

impl JoinableMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinableMode::Available => "available",
            JoinableMode::InProgress => "inprogress",
            JoinableMode::Unavailable => "unavailable",
            JoinableMode::Unreachable => "unreachable",
            JoinableMode::NoJoinable => "nojoinable",
        }
    }

    /// Modes in which a join control may be offered at all.
    pub fn admits_join(&self) -> bool {
        matches!(self, JoinableMode::Available | JoinableMode::InProgress)
    }
}

impl std::fmt::Display for JoinableMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity the resolver compares against owners and attendees.
#[derive(Debug, Clone, Copy)]
pub struct Viewer<'a> {
    pub id: &'a str,
    pub display_name: &'a str,
}

/// Everything the resolver reads besides the meeting and its live status.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub viewer: Viewer<'a>,
    pub perms: &'a Permissions,
    /// Server-synchronised time, epoch ms truncated to whole seconds.
    pub now_ms: i64,
    /// Site switch; the meeting flag only counts when this is on.
    pub multiple_sessions_enabled: bool,
}

/// Derived, never persisted, presentation state of one meeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    pub not_started: bool,
    pub finished: bool,
    pub joinable: bool,
    pub joinable_mode: JoinableMode,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_end: bool,
    pub show_join_link: bool,
    pub show_end_control: bool,
    /// Zero whenever the live status is missing or unusable.
    pub participant_count: u32,
    pub moderator_count: u32,
    pub running: bool,
    pub has_been_forcibly_ended: bool,
    pub unreachable_server: bool,
}

/// Window state from `[start, end)` bounds. Returns
/// `(not_started, finished, joinable)`.
pub fn time_window(meeting: &Meeting, now_ms: i64) -> (bool, bool, bool) {
    let start_ok = meeting.start_bound().map_or(true, |start| now_ms >= start);
    let end_ok = meeting.end_bound().map_or(true, |end| now_ms < end);
    (!start_ok && end_ok, start_ok && !end_ok, start_ok && end_ok)
}

/// Edit, delete and end capabilities for the viewer. Ending requires both
/// the edit and the delete capability.
pub fn capabilities(meeting: &Meeting, viewer_id: &str, perms: &Permissions) -> (bool, bool, bool) {
    if viewer_id == meeting.owner_id {
        let can_edit = perms.bbb_edit_own || perms.bbb_edit_any;
        let can_delete = perms.bbb_delete_own || perms.bbb_delete_any;
        (can_edit, can_delete, can_edit && can_delete)
    } else {
        (
            perms.bbb_edit_any,
            perms.bbb_delete_any,
            perms.bbb_edit_any && perms.bbb_delete_any,
        )
    }
}

/// Refine an open window with the live status. Order matters: forcibly
/// ended beats running.
pub fn joinable_mode(joinable: bool, live: Option<&LiveStatus>) -> JoinableMode {
    if !joinable {
        return JoinableMode::NoJoinable;
    }
    match live {
        Some(status) if status.is_reachable() => {
            if status.has_been_forcibly_ended {
                JoinableMode::Unavailable
            } else if status.is_running() {
                JoinableMode::InProgress
            } else {
                JoinableMode::Available
            }
        }
        _ => JoinableMode::Unreachable,
    }
}

/// Resolve the full presentation state of a meeting.
pub fn resolve(meeting: &Meeting, live: Option<&LiveStatus>, ctx: &ResolveContext<'_>) -> Availability {
    let (not_started, finished, joinable) = time_window(meeting, ctx.now_ms);
    let (can_edit, can_delete, can_end) = capabilities(meeting, ctx.viewer.id, ctx.perms);
    let joinable_mode = joinable_mode(joinable, live);

    // Attendees are matched by display name, which collides when two
    // participants share a name.
    let already_present = live.map_or(false, |s| s.has_attendee_named(ctx.viewer.display_name));
    let multiple_sessions = meeting.multiple_sessions_allowed && ctx.multiple_sessions_enabled;
    let show_join_link = joinable_mode.admits_join() && (multiple_sessions || !already_present);
    let show_end_control = can_end && joinable_mode == JoinableMode::InProgress;

    let usable = live.filter(|s| s.is_reachable());
    let counts_visible = matches!(
        joinable_mode,
        JoinableMode::Available | JoinableMode::InProgress | JoinableMode::NoJoinable
    );
    let (participant_count, moderator_count) = match usable {
        Some(s) if counts_visible => (s.participant_count, s.moderator_count),
        _ => (0, 0),
    };

    Availability {
        not_started,
        finished,
        joinable,
        joinable_mode,
        can_edit,
        can_delete,
        can_end,
        show_join_link,
        show_end_control,
        participant_count,
        moderator_count,
        running: usable.map_or(false, LiveStatus::is_running),
        has_been_forcibly_ended: usable.map_or(false, |s| s.has_been_forcibly_ended),
        unreachable_server: live.map_or(true, |s| !s.is_reachable()),
    }
}

impl Availability {
    pub fn label(&self) -> StatusLabel {
        StatusLabel::for_state(self)
    }
}
