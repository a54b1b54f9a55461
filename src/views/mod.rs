//! View state machine
//!
//! `Navigator` owns the session context, the refresh controller and the
//! client. Every transition goes through [`Navigator::switch_state`], which
//! cancels all timers, clears messages, reloads what the view shows and
//! schedules the timers the new view needs.

pub mod commands;
mod render;

pub use render::{format_ms, render_meeting_list, render_permissions, render_recordings};

use anyhow::{Context, Result};
use futures::future::join_all;

use crate::api::{self, ClientError, SiteClient};
use crate::config::Config;
use crate::models::{GroupInfo, Meeting, Recording};
use crate::perms::RolePermissions;
use crate::refresh::{Concern, RefreshController, RefreshIntervals};
use crate::session::{SessionContext, Severity, UserMessage};

use render::DetailView;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    CurrentMeetings,
    MeetingInfo {
        meeting_id: String,
        group_id: Option<String>,
    },
    Recordings,
    MeetingRecordings {
        meeting_id: String,
        group_id: Option<String>,
    },
    Permissions,
}

/// Timers a view keeps running while it is on screen.
pub fn timers_for(view: &View, intervals: &RefreshIntervals) -> Vec<(Concern, Option<std::time::Duration>)> {
    match view {
        View::CurrentMeetings => vec![(Concern::AllMeetings, intervals.meetings)],
        View::MeetingInfo { .. } => vec![
            (Concern::OneMeeting, intervals.meetings),
            (Concern::Recordings, intervals.recordings),
        ],
        View::Recordings | View::MeetingRecordings { .. } => {
            vec![(Concern::Recordings, intervals.recordings)]
        }
        View::Permissions => Vec::new(),
    }
}

pub struct Navigator {
    client: SiteClient,
    ctx: SessionContext,
    refresh: RefreshController,
    intervals: RefreshIntervals,
    view: View,
    filter: Option<String>,
    groups: Vec<GroupInfo>,
    site_roles: Vec<RolePermissions>,
}

impl Navigator {
    /// Settings first, then the user's permissions, then any view.
    pub async fn bootstrap(config: &Config) -> Result<Self> {
        let client = SiteClient::new(config)?;
        let settings = api::settings::get_settings(&client)
            .await
            .context("Failed to load tool settings")?;
        let ctx = SessionContext::new(settings)?;
        let intervals = RefreshIntervals::resolve(&ctx.settings.config.autorefresh_interval, config);

        Ok(Self {
            client,
            ctx,
            refresh: RefreshController::new(),
            intervals,
            view: View::CurrentMeetings,
            filter: None,
            groups: Vec::new(),
            site_roles: Vec::new(),
        })
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn client(&self) -> &SiteClient {
        &self.client
    }

    pub fn set_filter(&mut self, filter: Option<String>) {
        self.filter = filter;
    }

    /// Print a message unless an identical one is already showing.
    pub fn show(&mut self, message: UserMessage) {
        if let Some(shown) = self.ctx.notify(message) {
            eprintln!("{}", shown);
        }
    }

    fn report(&mut self, title: &str, err: &ClientError) {
        if let Some(shown) = self.ctx.report_failure(title, err) {
            eprintln!("{}", shown);
        }
    }

    /// Site notice configured for first access, if any.
    pub async fn show_notice(&mut self) {
        match api::meetings::get_notice(&self.client).await {
            Ok(notice) => {
                if let Some(text) = notice.text.filter(|t| !t.trim().is_empty()) {
                    let severity = Severity::from_level(notice.level.as_deref().unwrap_or(""));
                    self.show(UserMessage::new(severity, text));
                }
            }
            Err(e) => tracing::debug!("No notice: {}", e),
        }
    }

    /// Tear down the current view and enter `view`.
    pub async fn switch_state(&mut self, view: View) -> Result<()> {
        self.refresh.cancel_all();
        self.ctx.reset_view();
        tracing::info!("Switching to {:?}", view);
        self.view = view.clone();

        let entered = match &view {
            View::CurrentMeetings => self.enter_meeting_list().await,
            View::MeetingInfo {
                meeting_id,
                group_id,
            } => self.enter_meeting_info(meeting_id, group_id.as_deref()).await?,
            View::Recordings => self.enter_recordings(None, None).await,
            View::MeetingRecordings {
                meeting_id,
                group_id,
            } => {
                self.enter_recordings(Some(meeting_id), group_id.as_deref())
                    .await
            }
            View::Permissions => self.enter_permissions().await,
        };

        if entered {
            for (concern, period) in timers_for(&view, &self.intervals) {
                self.refresh.schedule_every(concern, period);
            }
        }
        Ok(())
    }

    async fn enter_meeting_list(&mut self) -> bool {
        if !self.ctx.perms.bbb_view_meeting_list {
            self.show(UserMessage::new(
                Severity::Warning,
                "You do not have permission to view meetings in this site",
            ));
            return false;
        }
        if !self.load_meetings().await {
            return false;
        }
        self.poll_all_meetings().await;
        self.render();
        true
    }

    async fn enter_meeting_info(&mut self, meeting_id: &str, group_id: Option<&str>) -> Result<bool> {
        if !self.load_meetings().await {
            return Ok(false);
        }
        let meeting = self.fetch_meeting(meeting_id).await?;
        self.groups = if meeting.group_sessions
            && self
                .ctx
                .settings
                .config
                .add_update_form_parameters
                .groupsessions_enabled
        {
            match api::meetings::list_groups(&self.client, meeting_id).await {
                Ok(groups) => groups,
                Err(e) => {
                    self.report("Unable to get the meeting groups", &e);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };
        self.poll_meeting(meeting_id, group_id).await;
        if self.shows_meeting_recordings(&meeting) {
            self.load_recordings(Some(meeting_id), group_id).await;
        } else {
            self.ctx.recordings.clear();
        }
        self.render();
        Ok(true)
    }

    async fn enter_recordings(&mut self, meeting_id: Option<&str>, group_id: Option<&str>) -> bool {
        if !self.ctx.perms.shows_recordings(self.ctx.recording_enabled()) {
            self.show(UserMessage::new(
                Severity::Warning,
                "You do not have permission to view recordings in this site",
            ));
            return false;
        }
        if !self.load_recordings(meeting_id, group_id).await {
            return false;
        }
        self.render();
        true
    }

    async fn enter_permissions(&mut self) -> bool {
        if !self.ctx.perms.shows_permissions() {
            self.show(UserMessage::new(
                Severity::Warning,
                "Only site maintainers can manage permissions",
            ));
            return false;
        }
        match api::perms::get_site_permissions(&self.client).await {
            Ok(roles) => self.site_roles = roles,
            Err(e) => {
                self.report("Unable to get the site permissions", &e);
                return false;
            }
        }
        self.render();
        true
    }

    /// Rebuild the meeting cache wholesale.
    async fn load_meetings(&mut self) -> bool {
        match api::meetings::list_meetings(&self.client).await {
            Ok(meetings) => {
                tracing::debug!("Loaded {} meetings", meetings.len());
                self.ctx.replace_meetings(meetings);
                true
            }
            Err(e) => {
                self.report("Unable to get the meeting list", &e);
                false
            }
        }
    }

    /// Fetch one meeting and upsert it into the cache.
    pub async fn fetch_meeting(&mut self, meeting_id: &str) -> Result<Meeting> {
        match api::meetings::get_meeting(&self.client, meeting_id).await {
            Ok(meeting) => {
                self.ctx.add_update_meeting(meeting.clone());
                Ok(meeting)
            }
            Err(e) => {
                self.report("Unable to get the meeting", &e);
                Err(e).with_context(|| format!("Failed to load meeting {}", meeting_id))
            }
        }
    }

    async fn load_recordings(&mut self, meeting_id: Option<&str>, group_id: Option<&str>) -> bool {
        let result = match meeting_id {
            Some(id) => api::recordings::list_meeting_recordings(&self.client, id, group_id).await,
            None => api::recordings::list_site_recordings(&self.client).await,
        };
        match result {
            Ok(recordings) => {
                self.ctx.recordings = recordings;
                true
            }
            Err(e) => {
                self.report("Unable to get the recordings", &e);
                false
            }
        }
    }

    /// Poll the live status of one meeting; a failure caches `None`.
    pub async fn poll_meeting(&mut self, meeting_id: &str, group_id: Option<&str>) {
        let status = match api::live::get_meeting_info(&self.client, meeting_id, group_id).await {
            Ok(status) => Some(status),
            Err(e) => {
                self.report("Unable to get the meeting status", &e);
                None
            }
        };
        self.ctx.set_live(meeting_id, group_id, status);
    }

    /// Poll every cached meeting concurrently. Completion order does not
    /// matter; each result lands under its own key.
    async fn poll_all_meetings(&mut self) {
        let ids: Vec<String> = self.ctx.meetings.iter().map(|m| m.id.clone()).collect();
        let client = &self.client;
        let results = join_all(ids.iter().map(|id| async move {
            (id, api::live::get_meeting_info(client, id, None).await)
        }))
        .await;

        for (id, result) in results {
            let status = match result {
                Ok(status) => Some(status),
                Err(e) => {
                    self.report("Unable to get the meeting status", &e);
                    None
                }
            };
            self.ctx.set_live(id, None, status);
        }
    }

    fn current_group(&self, group_id: Option<&str>) -> Option<&GroupInfo> {
        group_id.and_then(|id| self.groups.iter().find(|g| g.group_id == id))
    }

    pub fn join_url(&self, meeting_id: &str, group_id: Option<&str>) -> String {
        let title = self.current_group(group_id).map(|g| g.group_title.as_str());
        api::meetings::join_url(
            &self.client,
            meeting_id,
            group_id,
            title,
            chrono::Utc::now().timestamp_millis(),
        )
    }

    /// Print the current view.
    pub fn render(&self) {
        let text = match &self.view {
            View::CurrentMeetings => render_meeting_list(&self.ctx, self.filter.as_deref()),
            View::MeetingInfo {
                meeting_id,
                group_id,
            } => {
                let Some(meeting) = self.ctx.meeting(meeting_id) else {
                    return;
                };
                let join_url = self.join_url(meeting_id, group_id.as_deref());
                let recording_count = self.shows_meeting_recordings(meeting).then(|| {
                    self.ctx
                        .recordings
                        .iter()
                        .filter(|r| r.meeting_id == meeting.id)
                        .count()
                });
                render::render_meeting_detail(
                    &self.ctx,
                    &DetailView {
                        meeting,
                        group: self.current_group(group_id.as_deref()),
                        groups: &self.groups,
                        join_url: Some(&join_url),
                        recording_count,
                    },
                )
            }
            View::Recordings | View::MeetingRecordings { .. } => {
                render_recordings(&self.ctx, &self.ctx.recordings)
            }
            View::Permissions => render_permissions(&self.site_roles),
        };
        println!("{}", text);
    }

    fn shows_meeting_recordings(&self, meeting: &Meeting) -> bool {
        meeting.recording && self.ctx.perms.shows_recordings(self.ctx.recording_enabled())
    }

    /// Handle one timer tick for the current view.
    pub async fn on_tick(&mut self, concern: Concern) {
        tracing::debug!("Refresh tick {:?} for {:?}", concern, self.view);
        let earlier = self.ctx.messages.messages().len();
        match (concern, self.view.clone()) {
            (Concern::AllMeetings, View::CurrentMeetings) => {
                self.poll_all_meetings().await;
            }
            (
                Concern::OneMeeting | Concern::MeetingOnce,
                View::MeetingInfo {
                    meeting_id,
                    group_id,
                },
            ) => {
                if self.fetch_meeting(&meeting_id).await.is_err() {
                    return;
                }
                self.poll_meeting(&meeting_id, group_id.as_deref()).await;
            }
            (
                Concern::Recordings,
                View::MeetingInfo {
                    meeting_id,
                    group_id,
                },
            ) => {
                let shown = self
                    .ctx
                    .meeting(&meeting_id)
                    .map_or(false, |m| self.shows_meeting_recordings(m));
                if !shown {
                    return;
                }
                self.load_recordings(Some(&meeting_id), group_id.as_deref())
                    .await;
            }
            (
                Concern::Recordings,
                View::MeetingRecordings {
                    meeting_id,
                    group_id,
                },
            ) => {
                self.load_recordings(Some(&meeting_id), group_id.as_deref())
                    .await;
            }
            (Concern::Recordings, View::Recordings) => {
                self.load_recordings(None, None).await;
            }
            (concern, view) => {
                tracing::debug!("Ignoring {:?} tick in {:?}", concern, view);
                return;
            }
        }
        self.render();
        // Messages from earlier ticks stay visible under the refreshed view.
        for message in self.ctx.messages.messages().iter().take(earlier) {
            eprintln!("{}", message);
        }
    }

    /// After a join, replace the detail polling with one delayed refresh.
    pub fn after_join(&mut self) {
        if self.refresh.is_active(Concern::OneMeeting) {
            tracing::debug!("Replacing meeting polling with a single refresh");
        }
        self.refresh.cancel(Concern::OneMeeting);
        self.refresh.cancel(Concern::Recordings);
        self.refresh
            .schedule_once(Concern::MeetingOnce, self.intervals.after_join_delay());
    }

    /// Keep refreshing the current view until Ctrl-C.
    pub async fn watch(&mut self) -> Result<()> {
        if self.refresh.active_count() == 0 {
            println!("Nothing to refresh for this view (auto-refresh is disabled).");
        }
        println!("Watching... (Ctrl-C to stop)");
        loop {
            tokio::select! {
                tick = self.refresh.recv() => {
                    match tick {
                        Some(concern) => self.on_tick(concern).await,
                        None => break,
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    println!("Shutting down...");
                    break;
                }
            }
        }
        self.refresh.cancel_all();
        Ok(())
    }

    pub fn recordings(&self) -> &[Recording] {
        &self.ctx.recordings
    }

    pub fn context_mut(&mut self) -> &mut SessionContext {
        &mut self.ctx
    }
}
