//! Site role permission endpoints

use super::client::{SiteClient, SITE_PATH};
use super::error::ClientError;
use crate::perms::{parse_site_permissions, RolePermissions};

/// One checkbox of the permissions matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionChange {
    pub role: String,
    pub token: String,
    pub granted: bool,
}

impl PermissionChange {
    /// Parse `role:token=true|false`. The role may itself contain colons.
    pub fn parse(s: &str) -> Option<Self> {
        let (key, value) = s.split_once('=')?;
        let (role, token) = key.rsplit_once(':')?;
        let granted = value.trim().parse().ok()?;
        if role.is_empty() || token.is_empty() {
            return None;
        }
        Some(Self {
            role: role.to_string(),
            token: token.to_string(),
            granted,
        })
    }

    fn form_pair(&self) -> (String, String) {
        (format!("{}:{}", self.role, self.token), self.granted.to_string())
    }
}

pub fn site_perms_url(client: &SiteClient) -> String {
    client.url(&format!("{}/{}/perms/bbb.json", SITE_PATH, client.site_id()), &[])
}

pub fn set_perms_url(client: &SiteClient) -> String {
    client.url(&format!("{}/{}/setPerms", SITE_PATH, client.site_id()), &[])
}

pub async fn get_site_permissions(client: &SiteClient) -> Result<Vec<RolePermissions>, ClientError> {
    let value: serde_json::Value = client.get_json(&site_perms_url(client)).await?;
    Ok(parse_site_permissions(&value))
}

pub async fn set_site_permissions(
    client: &SiteClient,
    changes: &[PermissionChange],
) -> Result<(), ClientError> {
    let fields: Vec<(String, String)> = changes.iter().map(PermissionChange::form_pair).collect();
    client.post_form(&set_perms_url(client), &fields).await.map(|_| ())
}
