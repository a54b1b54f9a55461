//! Site groups and tool notices

use std::collections::HashMap;

use serde::Deserialize;

/// A site group a meeting can hold a separate session for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupInfo {
    pub group_id: String,
    pub group_title: String,
}

/// Response of `getGroups.json`, keyed `group0`, `group1`, ...
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct GroupMap(pub HashMap<String, GroupInfo>);

impl GroupMap {
    /// Groups in server order.
    pub fn into_sorted(self) -> Vec<GroupInfo> {
        let mut entries: Vec<(u32, GroupInfo)> = self
            .0
            .into_iter()
            .map(|(key, group)| {
                let index = key
                    .strip_prefix("group")
                    .and_then(|n| n.parse().ok())
                    .unwrap_or(u32::MAX);
                (index, group)
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.group_title.cmp(&b.1.group_title)));
        entries.into_iter().map(|(_, g)| g).collect()
    }
}

/// First-access notice configured by the site administrator.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Notice {
    pub text: Option<String>,
    pub level: Option<String>,
}
