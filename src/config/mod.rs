//! Configuration storage

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Keys accepted by `config set`.
pub const KEYS: &[&str] = &[
    "base_url",
    "site_id",
    "session_cookie",
    "meetings_refresh_ms",
    "recordings_refresh_ms",
    "timeout_secs",
];

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Portal root, e.g. https://lms.example.edu
    pub base_url: String,
    /// Site whose meetings tool is used
    pub site_id: Option<String>,
    /// Portal session id, sent as the JSESSIONID cookie
    pub session_cookie: Option<String>,
    /// Local override of the server meetings refresh interval (ms, 0 = off)
    pub meetings_refresh_ms: Option<u64>,
    /// Local override of the server recordings refresh interval (ms, 0 = off)
    pub recordings_refresh_ms: Option<u64>,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            site_id: None,
            session_cookie: None,
            meetings_refresh_ms: None,
            recordings_refresh_ms: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Get config directory path
    fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "bbb-meetings", "bbb-meetings")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }

    /// Get config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from disk, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load only what is on disk
    pub fn load_file() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir).context("Failed to create config directory")?;

        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, content).context("Failed to write config file")?;

        // Session cookie is a credential.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&path, perms).context("Failed to set config permissions")?;
        }

        Ok(())
    }

    /// Apply `BBB_BASE_URL`, `BBB_SITE_ID` and `BBB_SESSION`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = non_empty("BBB_BASE_URL") {
            self.base_url = url;
        }
        if let Some(site) = non_empty("BBB_SITE_ID") {
            self.site_id = Some(site);
        }
        if let Some(session) = non_empty("BBB_SESSION") {
            self.session_cookie = Some(session);
        }
    }

    /// Set a single key from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let optional = |v: &str| (!v.is_empty()).then(|| v.to_string());
        let millis = |v: &str| -> Result<Option<u64>> {
            if v.is_empty() {
                return Ok(None);
            }
            v.parse()
                .map(Some)
                .with_context(|| format!("'{}' is not a number of milliseconds", v))
        };

        match key {
            "base_url" => {
                let url = url::Url::parse(value)
                    .with_context(|| format!("'{}' is not a valid URL", value))?;
                self.base_url = url.as_str().trim_end_matches('/').to_string();
            }
            "site_id" => self.site_id = optional(value),
            "session_cookie" => self.session_cookie = optional(value),
            "meetings_refresh_ms" => self.meetings_refresh_ms = millis(value)?,
            "recordings_refresh_ms" => self.recordings_refresh_ms = millis(value)?,
            "timeout_secs" => {
                self.timeout_secs = value
                    .parse()
                    .with_context(|| format!("'{}' is not a number of seconds", value))?;
            }
            _ => bail!("Unknown config key '{}'. Known keys: {}", key, KEYS.join(", ")),
        }
        Ok(())
    }

    pub fn require_site_id(&self) -> Result<&str> {
        self.site_id
            .as_deref()
            .context("No site configured. Run 'bbb-meetings config set site_id <id>' or set BBB_SITE_ID.")
    }

    /// Printable key/value listing with the session cookie masked.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let opt = |v: &Option<String>| v.clone().unwrap_or_else(|| "(unset)".to_string());
        let ms = |v: Option<u64>| v.map_or_else(|| "(server)".to_string(), |n| n.to_string());
        vec![
            ("base_url", self.base_url.clone()),
            ("site_id", opt(&self.site_id)),
            (
                "session_cookie",
                self.session_cookie
                    .as_ref()
                    .map_or_else(|| "(unset)".to_string(), |_| "********".to_string()),
            ),
            ("meetings_refresh_ms", ms(self.meetings_refresh_ms)),
            ("recordings_refresh_ms", ms(self.recordings_refresh_ms)),
            ("timeout_secs", self.timeout_secs.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: Config = toml::from_str("site_id = \"s1\"").unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.site_id.as_deref(), Some("s1"));
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            "BBB_SITE_ID" => Some("site-9".to_string()),
            "BBB_SESSION" => Some("abc".to_string()),
            "BBB_BASE_URL" => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.site_id.as_deref(), Some("site-9"));
        assert_eq!(config.session_cookie.as_deref(), Some("abc"));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_set_keys() {
        let mut config = Config::default();
        assert_ok!(config.set("base_url", "https://lms.example.edu/"));
        assert_eq!(config.base_url, "https://lms.example.edu");
        assert_ok!(config.set("meetings_refresh_ms", "0"));
        assert_eq!(config.meetings_refresh_ms, Some(0));
        assert_ok!(config.set("meetings_refresh_ms", ""));
        assert_eq!(config.meetings_refresh_ms, None);
        assert_err!(config.set("timeout_secs", "soon"));
        assert_err!(config.set("colour", "blue"));
        assert_err!(config.set("base_url", "not a url"));
    }

    #[test]
    fn test_round_trip_and_masking() {
        let mut config = Config::default();
        config.session_cookie = Some("secret".into());
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back, config);

        let entries = config.entries();
        let cookie = entries.iter().find(|(k, _)| *k == "session_cookie").unwrap();
        assert_eq!(cookie.1, "********");
        assert_err!(Config::default().require_site_id());
    }
}
