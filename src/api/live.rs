//! Live session status endpoint

use super::client::{SiteClient, TOOL_PATH};
use super::error::ClientError;
use crate::models::LiveStatus;

pub fn meeting_info_url(client: &SiteClient, meeting_id: &str, group_id: Option<&str>) -> String {
    let path = format!("{}/{}/getMeetingInfo.json", TOOL_PATH, meeting_id);
    match group_id {
        Some(group) => client.url(&path, &[("groupId", group)]),
        None => client.url(&path, &[]),
    }
}

pub async fn get_meeting_info(
    client: &SiteClient,
    meeting_id: &str,
    group_id: Option<&str>,
) -> Result<LiveStatus, ClientError> {
    client
        .get_json(&meeting_info_url(client, meeting_id, group_id))
        .await
}
