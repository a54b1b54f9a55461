//! Caller-owned session context
//!
//! Holds everything the views share for one run: settings, the current
//! user and their permissions, the meeting cache, the last polled live
//! status per meeting, the server clock and the message log. Views rebuild
//! the meeting cache wholesale on every transition.

mod messages;

pub use messages::{describe_failure, failure_message, MessageLog, Severity, UserMessage};

use std::collections::HashMap;

use anyhow::{bail, Result};
use tokio::time::Instant;

use crate::api::ClientError;
use crate::availability::{self, Availability, ResolveContext, Viewer};
use crate::models::{CurrentUser, LiveStatus, Meeting, Recording, Settings};
use crate::perms::Permissions;

/// Server time kept in step with the local monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct ServerClock {
    server_ms: i64,
    synced_at: Instant,
}

impl ServerClock {
    /// Sync to a server timestamp; zero falls back to local wall time.
    pub fn new(server_ms: i64) -> Self {
        let server_ms = if server_ms > 0 {
            server_ms
        } else {
            chrono::Utc::now().timestamp_millis()
        };
        Self {
            server_ms,
            synced_at: Instant::now(),
        }
    }

    /// Current server time, truncated to whole seconds.
    pub fn now_ms(&self) -> i64 {
        let elapsed = self.synced_at.elapsed().as_millis() as i64;
        truncate_to_seconds(self.server_ms + elapsed)
    }
}

pub fn truncate_to_seconds(ms: i64) -> i64 {
    ms - ms.rem_euclid(1000)
}

/// Live status cache key: meeting id plus optional group.
pub type LiveKey = (String, Option<String>);

pub struct SessionContext {
    pub settings: Settings,
    pub user: CurrentUser,
    pub perms: Permissions,
    pub meetings: Vec<Meeting>,
    pub live: HashMap<LiveKey, Option<LiveStatus>>,
    pub recordings: Vec<Recording>,
    pub messages: MessageLog,
    pub clock: ServerClock,
}

impl SessionContext {
    /// Derive the user and permissions from freshly fetched settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let Some(user) = settings.current_user.clone() else {
            bail!("The server did not identify a current user. Is the session cookie valid?");
        };
        let perms = Permissions::from_value(&user.permissions);
        let clock = ServerClock::new(settings.config.server_time_in_default_timezone.timestamp);
        tracing::info!(
            "Session for {} ({})",
            user.display_name,
            user.role.as_deref().unwrap_or("no role")
        );

        Ok(Self {
            settings,
            user,
            perms,
            meetings: Vec::new(),
            live: HashMap::new(),
            recordings: Vec::new(),
            messages: MessageLog::default(),
            clock,
        })
    }

    pub fn meeting(&self, meeting_id: &str) -> Option<&Meeting> {
        self.meetings.iter().find(|m| m.id == meeting_id)
    }

    /// Replace the meeting cache and forget stale live status.
    pub fn replace_meetings(&mut self, meetings: Vec<Meeting>) {
        self.meetings = meetings;
        self.live.clear();
    }

    /// Insert a meeting, or replace the cached one with the same id.
    pub fn add_update_meeting(&mut self, meeting: Meeting) {
        match self.meetings.iter_mut().find(|m| m.id == meeting.id) {
            Some(existing) => *existing = meeting,
            None => self.meetings.push(meeting),
        }
    }

    pub fn remove_meeting(&mut self, meeting_id: &str) -> bool {
        let before = self.meetings.len();
        self.meetings.retain(|m| m.id != meeting_id);
        self.live.retain(|(id, _), _| id != meeting_id);
        self.meetings.len() != before
    }

    pub fn set_live(&mut self, meeting_id: &str, group_id: Option<&str>, status: Option<LiveStatus>) {
        self.live.insert(
            (meeting_id.to_string(), group_id.map(String::from)),
            status,
        );
    }

    pub fn live_status(&self, meeting_id: &str, group_id: Option<&str>) -> Option<&LiveStatus> {
        self.live
            .get(&(meeting_id.to_string(), group_id.map(String::from)))
            .and_then(Option::as_ref)
    }

    /// Resolve a cached meeting against its last polled status.
    pub fn resolve(&self, meeting: &Meeting, group_id: Option<&str>) -> Availability {
        let ctx = ResolveContext {
            viewer: Viewer {
                id: &self.user.id,
                display_name: &self.user.display_name,
            },
            perms: &self.perms,
            now_ms: self.clock.now_ms(),
            multiple_sessions_enabled: self
                .settings
                .config
                .add_update_form_parameters
                .multiplesessionsallowed_enabled,
        };
        availability::resolve(meeting, self.live_status(&meeting.id, group_id), &ctx)
    }

    pub fn recording_enabled(&self) -> bool {
        self.settings.config.add_update_form_parameters.recording_enabled
    }

    pub fn description_max_length(&self) -> u32 {
        self.settings
            .config
            .add_update_form_parameters
            .description_max_length
    }

    /// Drop everything shown in the current view.
    pub fn clear_content(&mut self) {
        self.meetings.clear();
        self.live.clear();
        self.recordings.clear();
    }

    /// Reset per-view state on a transition.
    pub fn reset_view(&mut self) {
        self.messages.clear();
    }

    /// Record a message; returns it when it has not been shown yet.
    pub fn notify(&mut self, message: UserMessage) -> Option<&UserMessage> {
        self.messages.push(message)
    }

    /// Record a request failure. A 403 also clears the view content.
    pub fn report_failure(&mut self, title: &str, err: &ClientError) -> Option<&UserMessage> {
        tracing::warn!("{}: {}", title, err);
        if err.is_forbidden() {
            self.clear_content();
            let body = describe_failure(err.status(), &err.status_text());
            return self.messages.push(
                UserMessage::new(Severity::Error, body)
                    .with_title("You do not have permission to perform this action"),
            );
        }
        self.messages.push(failure_message(title, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ToolConfig;
    use std::time::Duration;

    fn settings(perms: serde_json::Value, timestamp: i64) -> Settings {
        let mut config = ToolConfig::default();
        config.server_time_in_default_timezone.timestamp = timestamp;
        Settings {
            current_user: Some(CurrentUser {
                id: "u-1".into(),
                display_name: "Ada".into(),
                permissions: perms,
                ..Default::default()
            }),
            config,
            tool_version: None,
        }
    }

    fn meeting(id: &str) -> Meeting {
        Meeting {
            id: id.into(),
            owner_id: "u-1".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_truncate_to_seconds() {
        assert_eq!(truncate_to_seconds(1_700_000_000_999), 1_700_000_000_000);
        assert_eq!(truncate_to_seconds(2_000), 2_000);
        assert_eq!(truncate_to_seconds(-1), -1_000);
    }

    #[tokio::test]
    async fn test_clock_advances_with_local_time() {
        tokio::time::pause();
        let clock = ServerClock::new(1_000_400);
        assert_eq!(clock.now_ms(), 1_000_000);
        tokio::time::advance(Duration::from_millis(700)).await;
        assert_eq!(clock.now_ms(), 1_001_000);
    }

    #[test]
    fn test_requires_current_user() {
        let mut s = settings(serde_json::json!([]), 0);
        s.current_user = None;
        assert!(SessionContext::new(s).is_err());
    }

    #[tokio::test]
    async fn test_permissions_from_settings() {
        let ctx = SessionContext::new(settings(
            serde_json::json!(["bbb.edit.own", "bbb.delete.own"]),
            5_000,
        ))
        .unwrap();
        assert!(ctx.perms.bbb_edit_own);
        assert!(ctx.perms.bbb_view_meeting_list);
        let state = ctx.resolve(&meeting("m1"), None);
        assert!(state.can_end);
    }

    #[tokio::test]
    async fn test_cache_upsert_and_remove() {
        let mut ctx = SessionContext::new(settings(serde_json::json!([]), 0)).unwrap();
        ctx.replace_meetings(vec![meeting("a"), meeting("b")]);
        ctx.add_update_meeting(Meeting {
            name: "renamed".into(),
            ..meeting("a")
        });
        ctx.add_update_meeting(meeting("c"));
        assert_eq!(ctx.meetings.len(), 3);
        assert_eq!(ctx.meeting("a").unwrap().name, "renamed");

        ctx.set_live("b", None, Some(LiveStatus::default()));
        assert!(ctx.remove_meeting("b"));
        assert!(!ctx.remove_meeting("b"));
        assert!(ctx.live_status("b", None).is_none());
    }

    #[tokio::test]
    async fn test_forbidden_clears_content() {
        let mut ctx = SessionContext::new(settings(serde_json::json!([]), 0)).unwrap();
        ctx.replace_meetings(vec![meeting("a")]);
        let err = ClientError::Forbidden {
            url: "http://x".into(),
        };
        assert!(ctx.report_failure("Unable to get meetings", &err).is_some());
        assert!(ctx.meetings.is_empty());
        assert!(ctx.report_failure("Unable to get meetings", &err).is_none());

        ctx.reset_view();
        assert!(ctx.messages.messages().is_empty());
    }

    #[tokio::test]
    async fn test_unpolled_meeting_is_unreachable() {
        let ctx = SessionContext::new(settings(serde_json::json!([]), 0)).unwrap();
        let state = ctx.resolve(&meeting("m1"), None);
        assert_eq!(state.joinable_mode, crate::availability::JoinableMode::Unreachable);
    }
}
