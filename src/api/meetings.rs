//! Meeting CRUD, end and join endpoints

use super::client::{SiteClient, TOOL_PATH};
use super::error::ClientError;
use crate::form::MeetingForm;
use crate::models::{GroupInfo, GroupMap, Meeting, MeetingCollection, Notice};

pub fn list_url(client: &SiteClient) -> String {
    client.url(&format!("{}.json", TOOL_PATH), &[("siteId", client.site_id())])
}

pub fn meeting_url(client: &SiteClient, meeting_id: &str) -> String {
    client.url(&format!("{}/{}.json", TOOL_PATH, meeting_id), &[])
}

pub fn save_url(client: &SiteClient, meeting_id: Option<&str>) -> String {
    match meeting_id {
        Some(id) => client.url(&format!("{}/{}/edit", TOOL_PATH, id), &[]),
        None => client.url(&format!("{}/new", TOOL_PATH), &[]),
    }
}

pub fn end_url(client: &SiteClient, meeting_id: &str, group_id: Option<&str>, end_all: bool) -> String {
    let mut query = vec![("meetingID", meeting_id)];
    if let Some(group) = group_id {
        query.push(("groupId", group));
    }
    if end_all {
        query.push(("endAll", "true"));
    }
    client.url(&format!("{}/endMeeting", TOOL_PATH), &query)
}

/// Join link; the nonce keeps intermediaries from caching the redirect.
pub fn join_url(
    client: &SiteClient,
    meeting_id: &str,
    group_id: Option<&str>,
    group_title: Option<&str>,
    nonce_ms: i64,
) -> String {
    let nonce = nonce_ms.to_string();
    let mut query = vec![("nonce", nonce.as_str())];
    if let Some(group) = group_id {
        query.push(("groupId", group));
    }
    if let Some(title) = group_title {
        query.push(("groupTitle", title));
    }
    client.url(&format!("{}/{}/joinMeeting", TOOL_PATH, meeting_id), &query)
}

pub async fn list_meetings(client: &SiteClient) -> Result<Vec<Meeting>, ClientError> {
    let collection: MeetingCollection = client.get_json(&list_url(client)).await?;
    Ok(collection.meetings.unwrap_or_default())
}

pub async fn get_meeting(client: &SiteClient, meeting_id: &str) -> Result<Meeting, ClientError> {
    client.get_json(&meeting_url(client, meeting_id)).await
}

/// Create (`meeting_id == None`) or update a meeting; returns its id.
pub async fn save_meeting(
    client: &SiteClient,
    meeting_id: Option<&str>,
    form: &MeetingForm,
) -> Result<String, ClientError> {
    let fields = form.to_form_pairs(client.site_id());
    let returned = client.post_form(&save_url(client, meeting_id), &fields).await?;
    let returned = returned.trim();
    Ok(match (returned.is_empty(), meeting_id) {
        (true, Some(id)) => id.to_string(),
        _ => returned.to_string(),
    })
}

pub async fn delete_meeting(client: &SiteClient, meeting_id: &str) -> Result<(), ClientError> {
    client
        .delete(&client.url(&format!("{}/{}", TOOL_PATH, meeting_id), &[]))
        .await
}

pub async fn end_meeting(
    client: &SiteClient,
    meeting_id: &str,
    group_id: Option<&str>,
    end_all: bool,
) -> Result<(), ClientError> {
    client
        .get_text(&end_url(client, meeting_id, group_id, end_all))
        .await
        .map(|_| ())
}

pub async fn list_groups(client: &SiteClient, meeting_id: &str) -> Result<Vec<GroupInfo>, ClientError> {
    let url = client.url(
        &format!("{}/getGroups.json", TOOL_PATH),
        &[("meetingID", meeting_id)],
    );
    let groups: GroupMap = client.get_json(&url).await?;
    Ok(groups.into_sorted())
}

pub async fn get_notice(client: &SiteClient) -> Result<Notice, ClientError> {
    client
        .get_json(&client.url(&format!("{}/getNoticeText.json", TOOL_PATH), &[]))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn client() -> SiteClient {
        let config = Config {
            site_id: Some("site-1".into()),
            ..Config::default()
        };
        SiteClient::new(&config).unwrap()
    }

    #[test]
    fn test_crud_urls() {
        let c = client();
        assert_eq!(list_url(&c), "http://localhost:8080/direct/bbb-tool.json?siteId=site-1");
        assert_eq!(meeting_url(&c, "m1"), "http://localhost:8080/direct/bbb-tool/m1.json");
        assert_eq!(save_url(&c, None), "http://localhost:8080/direct/bbb-tool/new");
        assert_eq!(save_url(&c, Some("m1")), "http://localhost:8080/direct/bbb-tool/m1/edit");
    }

    #[test]
    fn test_end_url() {
        let c = client();
        assert_eq!(
            end_url(&c, "m1", None, false),
            "http://localhost:8080/direct/bbb-tool/endMeeting?meetingID=m1"
        );
        assert_eq!(
            end_url(&c, "m1", Some("g1"), true),
            "http://localhost:8080/direct/bbb-tool/endMeeting?meetingID=m1&groupId=g1&endAll=true"
        );
    }

    #[test]
    fn test_join_url() {
        let c = client();
        assert_eq!(
            join_url(&c, "m1", None, None, 1_700_000_000_123),
            "http://localhost:8080/direct/bbb-tool/m1/joinMeeting?nonce=1700000000123"
        );
        assert_eq!(
            join_url(&c, "m1", Some("g1"), Some("Lab A"), 5),
            "http://localhost:8080/direct/bbb-tool/m1/joinMeeting?nonce=5&groupId=g1&groupTitle=Lab+A"
        );
    }
}
