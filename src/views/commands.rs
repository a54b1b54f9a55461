//! Command entry points (print to stdout)

use anyhow::{bail, Context, Result};

use super::{format_ms, Navigator, View};
use crate::api::{self, perms::PermissionChange, recordings::RecordingAction};
use crate::availability::JoinableMode;
use crate::config::Config;
use crate::form::{FormEdits, MeetingForm};
use crate::perms::{RecordingAccess, TOOL_TOKENS};
use crate::session::{Severity, UserMessage};

/// Show the current user, permissions and tool settings.
pub async fn settings(config: &Config) -> Result<()> {
    let nav = Navigator::bootstrap(config).await?;
    let ctx = nav.context();
    let cfg = &ctx.settings.config;
    let time = &cfg.server_time_in_default_timezone;

    println!("\nUser:");
    println!("  Name:  {}", ctx.user.display_name);
    println!("  ID:    {}", ctx.user.id);
    if let Some(eid) = &ctx.user.eid {
        println!("  EID:   {}", eid);
    }
    if let Some(role) = &ctx.user.role {
        println!("  Role:  {}", role);
    }

    let granted: Vec<&str> = TOOL_TOKENS
        .iter()
        .copied()
        .chain(["bbb.admin", "site.upd"])
        .filter(|t| ctx.perms.has(t))
        .collect();
    println!("\nPermissions:");
    if granted.is_empty() {
        println!("  (none)");
    }
    for token in granted {
        println!("  {}", token);
    }

    println!("\nTool:");
    println!(
        "  Server time:        {} ({})",
        format_ms(time.timestamp, time.timezone_offset),
        time.timezone_id.as_deref().unwrap_or("unknown timezone")
    );
    println!("  Meetings refresh:   {} ms", cfg.autorefresh_interval.meetings);
    println!("  Recordings refresh: {} ms", cfg.autorefresh_interval.recordings);
    println!(
        "  Recording:          {}",
        if ctx.recording_enabled() { "enabled" } else { "disabled" }
    );
    println!(
        "  Multiple sessions:  {}",
        if cfg.add_update_form_parameters.multiplesessionsallowed_enabled {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!("  Description limit:  {}", ctx.description_max_length());
    if let Some(version) = &ctx.settings.tool_version {
        println!("  Version:            {}", version);
    }
    Ok(())
}

pub async fn meetings(config: &Config, filter: Option<String>) -> Result<()> {
    let mut nav = Navigator::bootstrap(config).await?;
    nav.set_filter(filter);
    nav.switch_state(View::CurrentMeetings).await?;
    nav.show_notice().await;
    Ok(())
}

pub async fn show(config: &Config, meeting_id: &str, group_id: Option<String>) -> Result<()> {
    let mut nav = Navigator::bootstrap(config).await?;
    nav.switch_state(View::MeetingInfo {
        meeting_id: meeting_id.to_string(),
        group_id,
    })
    .await
}

/// What `watch` keeps on screen.
pub enum WatchTarget {
    Meetings,
    Meeting { id: String, group_id: Option<String> },
    Recordings { meeting_id: Option<String>, group_id: Option<String> },
}

pub async fn watch(config: &Config, target: WatchTarget) -> Result<()> {
    let mut nav = Navigator::bootstrap(config).await?;
    let view = match target {
        WatchTarget::Meetings => View::CurrentMeetings,
        WatchTarget::Meeting { id, group_id } => View::MeetingInfo {
            meeting_id: id,
            group_id,
        },
        WatchTarget::Recordings {
            meeting_id: Some(meeting_id),
            group_id,
        } => View::MeetingRecordings {
            meeting_id,
            group_id,
        },
        WatchTarget::Recordings { meeting_id: None, .. } => View::Recordings,
    };
    nav.switch_state(view).await?;
    nav.watch().await
}

/// Validate a form, printing every problem. Nothing is sent when invalid.
fn check_form(nav: &mut Navigator, form: &MeetingForm) -> Result<()> {
    let max = nav.context().description_max_length();
    if let Err(errors) = form.validate(max) {
        let count = errors.len();
        for error in errors {
            nav.show(UserMessage::new(Severity::Warning, error.to_string()));
        }
        bail!("Meeting not saved: {} problem(s) in the form", count);
    }
    Ok(())
}

fn tz_offset(nav: &Navigator) -> i64 {
    nav.context()
        .settings
        .config
        .server_time_in_default_timezone
        .timezone_offset
}

pub async fn create(config: &Config, edits: FormEdits) -> Result<()> {
    let mut nav = Navigator::bootstrap(config).await?;
    if !nav.context().perms.bbb_create {
        bail!("You do not have permission to create meetings in this site");
    }

    let params = &nav.context().settings.config.add_update_form_parameters;
    let mut form = MeetingForm::new(params);
    edits.apply(&mut form, params, tz_offset(&nav))?;
    check_form(&mut nav, &form)?;

    let id = api::meetings::save_meeting(nav.client(), None, &form)
        .await
        .context("Unable to create meeting")?;
    let meeting = nav.fetch_meeting(&id).await?;
    println!("Created meeting '{}' ({})", meeting.name, meeting.id);
    Ok(())
}

pub async fn edit(config: &Config, meeting_id: &str, edits: FormEdits) -> Result<()> {
    let mut nav = Navigator::bootstrap(config).await?;
    let meeting = nav.fetch_meeting(meeting_id).await?;
    if !nav.context().resolve(&meeting, None).can_edit {
        bail!("You do not have permission to edit '{}'", meeting.name);
    }

    let mut form = MeetingForm::from_meeting(&meeting);
    edits.apply(
        &mut form,
        &nav.context().settings.config.add_update_form_parameters,
        tz_offset(&nav),
    )?;
    check_form(&mut nav, &form)?;

    let id = api::meetings::save_meeting(nav.client(), Some(meeting_id), &form)
        .await
        .context("Unable to update meeting")?;
    let meeting = nav.fetch_meeting(&id).await?;
    println!("Updated meeting '{}' ({})", meeting.name, meeting.id);
    Ok(())
}

pub async fn delete(config: &Config, meeting_id: &str) -> Result<()> {
    let mut nav = Navigator::bootstrap(config).await?;
    let meeting = nav.fetch_meeting(meeting_id).await?;
    if !nav.context().resolve(&meeting, None).can_delete {
        bail!("You do not have permission to delete '{}'", meeting.name);
    }

    api::meetings::delete_meeting(nav.client(), meeting_id)
        .await
        .with_context(|| format!("Unable to delete meeting '{}'", meeting.name))?;
    nav.context_mut().remove_meeting(meeting_id);
    println!("Deleted meeting '{}'", meeting.name);
    Ok(())
}

pub async fn end(config: &Config, meeting_id: &str, group_id: Option<String>, all: bool) -> Result<()> {
    let mut nav = Navigator::bootstrap(config).await?;
    nav.switch_state(View::MeetingInfo {
        meeting_id: meeting_id.to_string(),
        group_id: group_id.clone(),
    })
    .await?;

    let ctx = nav.context();
    let Some(meeting) = ctx.meeting(meeting_id).cloned() else {
        bail!("Meeting {} is not available", meeting_id);
    };
    let state = ctx.resolve(&meeting, group_id.as_deref());
    if !state.can_end {
        bail!("You do not have permission to end '{}'", meeting.name);
    }
    if all {
        if !ctx.perms.shows_end_all() {
            bail!("Ending all sessions of a meeting needs the bbb.delete.any permission");
        }
    } else if !state.show_end_control {
        bail!("'{}' is not in progress ({})", meeting.name, state.label());
    }

    api::meetings::end_meeting(nav.client(), meeting_id, group_id.as_deref(), all)
        .await
        .with_context(|| format!("Unable to end meeting '{}'", meeting.name))?;
    nav.poll_meeting(meeting_id, group_id.as_deref()).await;
    let state = nav.context().resolve(&meeting, group_id.as_deref());
    println!("Ended '{}'; status is now: {}", meeting.name, state.label());
    Ok(())
}

pub async fn join(config: &Config, meeting_id: &str, group_id: Option<String>, watch: bool) -> Result<()> {
    let mut nav = Navigator::bootstrap(config).await?;
    nav.switch_state(View::MeetingInfo {
        meeting_id: meeting_id.to_string(),
        group_id: group_id.clone(),
    })
    .await?;

    let ctx = nav.context();
    let Some(meeting) = ctx.meeting(meeting_id).cloned() else {
        bail!("Meeting {} is not available", meeting_id);
    };
    let state = ctx.resolve(&meeting, group_id.as_deref());
    if !state.show_join_link {
        if state.joinable_mode.admits_join() {
            bail!("You are already in '{}'", meeting.name);
        }
        match state.joinable_mode {
            JoinableMode::NoJoinable => bail!("'{}' cannot be joined ({})", meeting.name, state.label()),
            _ => bail!("'{}' cannot be joined right now: {}", meeting.name, state.label()),
        }
    }

    println!("Open this link to join:\n  {}", nav.join_url(meeting_id, group_id.as_deref()));
    if watch {
        nav.after_join();
        nav.watch().await?;
    }
    Ok(())
}

pub async fn recordings(config: &Config, meeting_id: Option<String>, group_id: Option<String>) -> Result<()> {
    let mut nav = Navigator::bootstrap(config).await?;
    let view = match meeting_id {
        Some(meeting_id) => View::MeetingRecordings {
            meeting_id,
            group_id,
        },
        None => View::Recordings,
    };
    nav.switch_state(view).await
}

pub async fn recording_action(
    config: &Config,
    action: RecordingAction,
    meeting_id: &str,
    record_id: &str,
) -> Result<()> {
    let mut nav = Navigator::bootstrap(config).await?;
    let view = View::MeetingRecordings {
        meeting_id: meeting_id.to_string(),
        group_id: None,
    };
    nav.switch_state(view.clone()).await?;

    let ctx = nav.context();
    let Some(recording) = nav.recordings().iter().find(|r| r.record_id == record_id) else {
        bail!("Recording {} not found for meeting {}", record_id, meeting_id);
    };
    let access = RecordingAccess::resolve(recording, &ctx.user.id, &ctx.perms);
    let allowed = match action {
        RecordingAction::Delete => access.can_delete,
        _ => access.can_edit,
    };
    if !allowed {
        bail!("You do not have permission to {} this recording", action.as_str());
    }

    api::recordings::apply_action(nav.client(), action, meeting_id, record_id)
        .await
        .with_context(|| format!("Unable to {} recording {}", action.as_str(), record_id))?;
    println!("Recording {}: {} done", record_id, action.as_str());
    nav.switch_state(view).await
}

pub async fn perms(config: &Config, set: Vec<String>) -> Result<()> {
    let mut nav = Navigator::bootstrap(config).await?;
    if set.is_empty() {
        return nav.switch_state(View::Permissions).await;
    }

    if !nav.context().perms.shows_permissions() {
        bail!("Only site maintainers can manage permissions");
    }
    let changes = set
        .iter()
        .map(|s| {
            PermissionChange::parse(s)
                .with_context(|| format!("Invalid permission change '{}', expected role:token=true|false", s))
        })
        .collect::<Result<Vec<_>>>()?;

    api::perms::set_site_permissions(nav.client(), &changes)
        .await
        .context("Unable to set the site permissions")?;
    println!("Updated {} permission(s)", changes.len());
    nav.switch_state(View::Permissions).await
}

pub fn config_show(config: &Config) -> Result<()> {
    println!("\nConfig ({}):", Config::config_path()?.display());
    for (key, value) in config.entries() {
        println!("  {:<22} {}", key, value);
    }
    Ok(())
}

pub fn config_set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_file()?;
    config.set(key, value)?;
    config.save()?;
    println!("Set {}", key);
    Ok(())
}
