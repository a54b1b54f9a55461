//! Plain-text rendering of the views

use std::fmt::Write;

use chrono::{DateTime, FixedOffset, Utc};

use crate::availability::{Availability, ParticipantSummary};
use crate::models::{GroupInfo, LiveStatus, Meeting, Recording};
use crate::perms::{all_site_members_can_participate, RecordingAccess, RolePermissions, TOOL_TOKENS};
use crate::session::SessionContext;

/// Format epoch ms in the server timezone.
pub fn format_ms(ms: i64, tz_offset_ms: i64) -> String {
    let Some(utc) = DateTime::<Utc>::from_timestamp_millis(ms) else {
        return ms.to_string();
    };
    match FixedOffset::east_opt((tz_offset_ms / 1000) as i32) {
        Some(offset) => utc.with_timezone(&offset).format("%Y-%m-%d %H:%M").to_string(),
        None => utc.format("%Y-%m-%d %H:%M UTC").to_string(),
    }
}

fn format_bound(bound: Option<i64>, tz_offset_ms: i64) -> String {
    bound.map_or_else(|| "-".to_string(), |ms| format_ms(ms, tz_offset_ms))
}

/// `GMT+2` style label of the server timezone.
pub fn timezone_label(tz_offset_ms: i64) -> String {
    let hours = tz_offset_ms as f64 / 3_600_000.0;
    if tz_offset_ms > 0 {
        format!("GMT+{}", hours)
    } else {
        format!("GMT{}", hours)
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('~');
    out
}

fn actions(state: &Availability) -> String {
    let mut out = Vec::new();
    if state.show_join_link {
        out.push("join");
    }
    if state.show_end_control {
        out.push("end");
    }
    if state.can_edit {
        out.push("edit");
    }
    if state.can_delete {
        out.push("delete");
    }
    out.join(",")
}

/// Navigation entries the current user may use.
pub fn render_navigation(ctx: &SessionContext) -> String {
    let mut entries = vec!["meetings"];
    if ctx.perms.shows_recordings(ctx.recording_enabled()) {
        entries.push("recordings");
    }
    if ctx.perms.shows_permissions() {
        entries.push("perms");
    }
    if ctx.perms.bbb_create {
        entries.push("create");
    }
    if ctx.perms.shows_end_all() {
        entries.push("end --all");
    }
    format!("Available commands: {}", entries.join(" | "))
}

/// Case-insensitive match on the text a row shows.
fn matches_filter(meeting: &Meeting, filter: Option<&str>) -> bool {
    let Some(filter) = filter.map(str::trim).filter(|f| !f.is_empty()) else {
        return true;
    };
    let needle = filter.to_lowercase();
    let haystack = format!(
        "{} {} {}",
        meeting.name,
        meeting.owner_display_name.as_deref().unwrap_or(""),
        meeting.id
    )
    .to_lowercase();
    haystack.contains(&needle)
}

pub fn render_meeting_list(ctx: &SessionContext, filter: Option<&str>) -> String {
    let tz = ctx.settings.config.server_time_in_default_timezone.timezone_offset;
    let mut out = String::new();

    let rows: Vec<&Meeting> = ctx
        .meetings
        .iter()
        .filter(|m| matches_filter(m, filter))
        .collect();

    let _ = writeln!(out, "\nMeetings ({}):", timezone_label(tz));
    let _ = writeln!(out, "{:-<118}", "");
    if rows.is_empty() {
        let _ = writeln!(out, "  (no meetings)");
    } else {
        let _ = writeln!(
            out,
            "  {:<36} {:<24} {:<18} {:>5} {:<16} {:<16} ACTIONS",
            "ID", "NAME", "STATUS", "USERS", "START", "END"
        );
        for meeting in rows {
            let state = ctx.resolve(meeting, None);
            let _ = writeln!(
                out,
                "  {:<36} {:<24} {:<18} {:>5} {:<16} {:<16} {}",
                meeting.id,
                truncate(&meeting.name, 24),
                state.label().text,
                state.participant_count,
                format_bound(meeting.start_bound(), tz),
                format_bound(meeting.end_bound(), tz),
                actions(&state),
            );
        }
    }
    let _ = writeln!(out, "{}", render_navigation(ctx));
    if ctx.perms.site_update {
        if let Some(version) = &ctx.settings.tool_version {
            let _ = writeln!(out, "Tool version: {}", version);
        }
    }
    out
}

pub struct DetailView<'a> {
    pub meeting: &'a Meeting,
    pub group: Option<&'a GroupInfo>,
    pub groups: &'a [GroupInfo],
    pub join_url: Option<&'a str>,
    pub recording_count: Option<usize>,
}

pub fn render_meeting_detail(ctx: &SessionContext, view: &DetailView<'_>) -> String {
    let meeting = view.meeting;
    let group_id = view.group.map(|g| g.group_id.as_str());
    let tz = ctx.settings.config.server_time_in_default_timezone.timezone_offset;
    let state = ctx.resolve(meeting, group_id);
    let label = state.label();
    let live: Option<&LiveStatus> = ctx.live_status(&meeting.id, group_id);
    let summary = ParticipantSummary::from_status(state.joinable_mode, live);
    let mut out = String::new();

    let _ = writeln!(out, "\n{}", meeting.name);
    let _ = writeln!(out, "{:-<60}", "");
    let _ = writeln!(out, "  ID:         {}", meeting.id);
    if let Some(owner) = &meeting.owner_display_name {
        let _ = writeln!(out, "  Owner:      {}", owner);
    }
    let _ = writeln!(out, "  Start:      {}", format_bound(meeting.start_bound(), tz));
    let _ = writeln!(out, "  End:        {}", format_bound(meeting.end_bound(), tz));
    let _ = writeln!(out, "  Status:     {} ({})", label.text, label.class);
    if let Some(group) = view.group {
        let _ = writeln!(out, "  Group:      {}", group.group_title);
    }
    if let Some(welcome) = meeting.welcome_message().filter(|w| !w.is_empty()) {
        let _ = writeln!(out, "  Welcome:    {}", welcome);
    }

    let mut flags = Vec::new();
    if meeting.recording {
        flags.push("recording".to_string());
    }
    if let Some(minutes) = meeting.recording_duration.filter(|d| *d > 0) {
        flags.push(format!("max {} min", minutes));
    }
    if meeting.wait_for_moderator {
        flags.push("wait for moderator".to_string());
    }
    if meeting.multiple_sessions_allowed {
        flags.push("multiple sessions".to_string());
    }
    if meeting.group_sessions {
        flags.push("group sessions".to_string());
    }
    if !flags.is_empty() {
        let _ = writeln!(out, "  Options:    {}", flags.join(", "));
    }

    let _ = writeln!(
        out,
        "  Invited:    {} selection(s), {} as moderator",
        meeting.participants.len(),
        meeting.moderator_entries()
    );
    if let Some(p) = meeting.participant_for(&ctx.user.id, ctx.user.role.as_deref()) {
        let _ = writeln!(out, "  You join as {}", p.role.as_str());
    }

    let _ = writeln!(
        out,
        "  In session: {} ({} moderators, {} attendees)",
        summary.total, summary.moderators, summary.attendees
    );
    for name in &summary.moderator_names {
        let _ = writeln!(out, "    * {} (moderator)", name);
    }
    for name in &summary.attendee_names {
        let _ = writeln!(out, "    - {}", name);
    }

    if !view.groups.is_empty() && view.group.is_none() {
        let _ = writeln!(out, "  Groups:");
        for group in view.groups {
            let _ = writeln!(out, "    {:<24} {}", group.group_id, group.group_title);
        }
    }
    if let Some(count) = view.recording_count {
        let _ = writeln!(out, "  Recordings: {}", count);
    }

    if state.show_join_link {
        if let Some(url) = view.join_url {
            let _ = writeln!(out, "\n  Join: {}", url);
        }
    }
    if state.show_end_control {
        let _ = writeln!(out, "  End with: bbb-meetings end {}", meeting.id);
    }
    out
}

pub fn render_recordings(ctx: &SessionContext, recordings: &[Recording]) -> String {
    let tz = ctx.settings.config.server_time_in_default_timezone.timezone_offset;
    let filter_enabled = ctx.settings.config.recording_format_filter_enabled;
    let mut out = String::new();

    let _ = writeln!(out, "\nRecordings ({}):", timezone_label(tz));
    let _ = writeln!(out, "{:-<60}", "");
    if recordings.is_empty() {
        let _ = writeln!(out, "  (no recordings)");
        return out;
    }

    for recording in recordings {
        let access = RecordingAccess::resolve(recording, &ctx.user.id, &ctx.perms);
        let mut state = vec![if recording.published { "published" } else { "unpublished" }];
        if recording.protected {
            state.push("protected");
        }
        let _ = writeln!(
            out,
            "  {} [{}]",
            if recording.name.is_empty() { &recording.record_id } else { &recording.name },
            state.join(", ")
        );
        let _ = writeln!(
            out,
            "    {} / {}   meeting {}",
            recording.record_id,
            format_bound(recording.start_time, tz),
            recording.meeting_id
        );
        for playback in access.visible_playbacks(recording, filter_enabled) {
            let _ = writeln!(
                out,
                "    {:<14} {:>4} min  {}",
                playback.format, playback.length, playback.url
            );
        }
        if !access.images.is_empty() {
            let _ = writeln!(out, "    {} preview images", access.images.len());
        }
        let mut allowed = Vec::new();
        if access.can_edit {
            allowed.push("publish/protect");
        }
        if access.can_delete {
            allowed.push("delete");
        }
        if !allowed.is_empty() {
            let _ = writeln!(out, "    You may: {}", allowed.join(", "));
        }
    }
    out
}

pub fn render_permissions(roles: &[RolePermissions]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\nPermissions:");
    let _ = writeln!(out, "{:-<60}", "");
    if roles.is_empty() {
        let _ = writeln!(out, "  (no roles)");
        return out;
    }

    for role in roles {
        let _ = writeln!(out, "  {}", role.role);
        for token in std::iter::once(&"bbb.admin").chain(TOOL_TOKENS) {
            let mark = if role.perms.has(token) { "x" } else { " " };
            let _ = writeln!(out, "    [{}] {}", mark, token);
        }
    }
    if all_site_members_can_participate(roles) {
        let _ = writeln!(out, "All site members can participate in meetings.");
    }
    out
}
