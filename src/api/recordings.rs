//! Recording listing and state toggles

use super::client::{SiteClient, TOOL_PATH};
use super::error::ClientError;
use crate::models::{Recording, RecordingList, ReturnCode};

/// Recording state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingAction {
    Publish,
    Unpublish,
    Protect,
    Unprotect,
    Delete,
}

impl RecordingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordingAction::Publish => "publish",
            RecordingAction::Unpublish => "unpublish",
            RecordingAction::Protect => "protect",
            RecordingAction::Unprotect => "unprotect",
            RecordingAction::Delete => "delete",
        }
    }
}

pub fn site_recordings_url(client: &SiteClient) -> String {
    client.url(
        &format!("{}/getSiteRecordings.json", TOOL_PATH),
        &[("siteId", client.site_id())],
    )
}

pub fn meeting_recordings_url(client: &SiteClient, meeting_id: &str, group_id: Option<&str>) -> String {
    let path = format!("{}/{}/getRecordings.json", TOOL_PATH, meeting_id);
    match group_id {
        Some(group) => client.url(&path, &[("groupId", group)]),
        None => client.url(&path, &[]),
    }
}

pub fn action_url(client: &SiteClient, action: RecordingAction, meeting_id: &str, record_id: &str) -> String {
    let base = [("meetingID", meeting_id), ("recordID", record_id)];
    let (endpoint, flag) = match action {
        RecordingAction::Publish => ("publishRecordings", Some(("publish", "true"))),
        RecordingAction::Unpublish => ("publishRecordings", Some(("publish", "false"))),
        RecordingAction::Protect => ("protectRecordings", Some(("protect", "true"))),
        RecordingAction::Unprotect => ("protectRecordings", Some(("protect", "false"))),
        RecordingAction::Delete => ("deleteRecordings", None),
    };
    let mut query = base.to_vec();
    query.extend(flag);
    client.url(&format!("{}/{}", TOOL_PATH, endpoint), &query)
}

/// Recordings from a list response; a FAILED list yields none.
fn into_recordings(list: RecordingList) -> Vec<Recording> {
    if list.returncode != ReturnCode::Success {
        tracing::warn!(
            "Recording list failed: {}",
            list.message_key.as_deref().unwrap_or("no message key")
        );
        return Vec::new();
    }
    list.recordings.unwrap_or_default()
}

pub async fn list_site_recordings(client: &SiteClient) -> Result<Vec<Recording>, ClientError> {
    let list: RecordingList = client.get_json(&site_recordings_url(client)).await?;
    Ok(into_recordings(list))
}

pub async fn list_meeting_recordings(
    client: &SiteClient,
    meeting_id: &str,
    group_id: Option<&str>,
) -> Result<Vec<Recording>, ClientError> {
    let list: RecordingList = client
        .get_json(&meeting_recordings_url(client, meeting_id, group_id))
        .await?;
    Ok(into_recordings(list))
}

pub async fn apply_action(
    client: &SiteClient,
    action: RecordingAction,
    meeting_id: &str,
    record_id: &str,
) -> Result<(), ClientError> {
    client
        .get_text(&action_url(client, action, meeting_id, record_id))
        .await
        .map(|_| ())
}
