//! Tool settings endpoint

use super::client::{SiteClient, TOOL_PATH};
use super::error::ClientError;
use crate::models::Settings;

pub fn settings_url(client: &SiteClient) -> String {
    client.url(
        &format!("{}/getSettings.json", TOOL_PATH),
        &[("siteId", client.site_id())],
    )
}

pub async fn get_settings(client: &SiteClient) -> Result<Settings, ClientError> {
    client.get_json(&settings_url(client)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_settings_url() {
        let config = Config {
            site_id: Some("site-1".into()),
            base_url: "https://lms.example.edu".into(),
            ..Config::default()
        };
        let c = SiteClient::new(&config).unwrap();
        assert_eq!(
            settings_url(&c),
            "https://lms.example.edu/direct/bbb-tool/getSettings.json?siteId=site-1"
        );
    }
}
