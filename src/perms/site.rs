//! Per-role permission table of a site

use serde_json::Value;

use super::Permissions;

/// Tokens granted to one site role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePermissions {
    pub role: String,
    pub tokens: Vec<String>,
    pub perms: Permissions,
}

/// Normalise `/perms/bbb.json`. Older hosts return `{ role: [tokens] }`,
/// newer ones wrap the same map as `{ "data": { role: [tokens] } }`.
pub fn parse_site_permissions(value: &Value) -> Vec<RolePermissions> {
    let roles = match value.get("data") {
        Some(Value::Object(map)) => map,
        _ => match value {
            Value::Object(map) => map,
            _ => return Vec::new(),
        },
    };

    roles
        .iter()
        .map(|(role, tokens)| {
            let tokens: Vec<String> = tokens
                .as_array()
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default();
            RolePermissions {
                role: role.clone(),
                perms: Permissions::from_tokens(&tokens),
                tokens,
            }
        })
        .collect()
}

/// True when every role of the site may join meetings.
pub fn all_site_members_can_participate(roles: &[RolePermissions]) -> bool {
    !roles.is_empty() && roles.iter().all(|r| r.perms.bbb_participate)
}
