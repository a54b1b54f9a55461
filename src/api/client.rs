//! Session-authenticated HTTP client for the site's entity endpoints
//!
//! Wraps reqwest::Client with the portal session cookie and maps every
//! non-2xx response to a [`ClientError`].

use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use super::error::{status_error, ClientError};
use crate::config::Config;

/// Entity broker root of the meetings tool.
pub const TOOL_PATH: &str = "/direct/bbb-tool";
/// Entity broker root of sites.
pub const SITE_PATH: &str = "/direct/site";

const SESSION_COOKIE: &str = "JSESSIONID";

/// Client bound to one portal and one site.
pub struct SiteClient {
    http: reqwest::Client,
    base_url: url::Url,
    site_id: String,
    session_cookie: Option<String>,
}

impl SiteClient {
    /// Build a client from config. Fails if no site is configured.
    pub fn new(config: &Config) -> Result<Self> {
        let site_id = config.require_site_id()?.to_string();
        let base_url = url::Url::parse(&config.base_url)
            .with_context(|| format!("Invalid base URL '{}'", config.base_url))?;
        if config.session_cookie.is_none() {
            tracing::warn!("No session cookie configured; requests will be anonymous");
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url,
            site_id,
            session_cookie: config.session_cookie.clone(),
        })
    }

    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    /// Absolute URL for `path` with `query` pairs percent-encoded.
    pub fn url(&self, path: &str, query: &[(&str, &str)]) -> String {
        build_url(&self.base_url, path, query)
    }

    fn with_session(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.session_cookie {
            Some(session) => req.header(
                reqwest::header::COOKIE,
                format!("{}={}", SESSION_COOKIE, session),
            ),
            None => req,
        }
    }

    /// GET and decode a JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ClientError> {
        let text = self.get_text(url).await?;
        serde_json::from_str(&text).map_err(|source| ClientError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// GET and return the raw body.
    pub async fn get_text(&self, url: &str) -> Result<String, ClientError> {
        tracing::debug!("GET {}", url);
        let resp = self.with_session(self.http.get(url)).send().await?;
        let resp = check_response(resp, url).await?;
        Ok(resp.text().await?)
    }

    /// POST a form-encoded body and return the response text.
    pub async fn post_form(
        &self,
        url: &str,
        fields: &[(String, String)],
    ) -> Result<String, ClientError> {
        tracing::debug!("POST {} ({} fields)", url, fields.len());
        let resp = self
            .with_session(self.http.post(url))
            .form(fields)
            .send()
            .await?;
        let resp = check_response(resp, url).await?;
        Ok(resp.text().await?)
    }

    pub async fn delete(&self, url: &str) -> Result<(), ClientError> {
        tracing::debug!("DELETE {}", url);
        let resp = self.with_session(self.http.delete(url)).send().await?;
        check_response(resp, url).await?;
        Ok(())
    }
}

fn build_url(base: &url::Url, path: &str, query: &[(&str, &str)]) -> String {
    let mut url = base.clone();
    let prefix = base.path().trim_end_matches('/');
    url.set_path(&format!("{}{}", prefix, path));
    if query.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(query);
    }
    url.to_string()
}

/// Check HTTP response status code and return a typed error on failure.
async fn check_response(
    resp: reqwest::Response,
    url: &str,
) -> Result<reqwest::Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(status_error(status, url, body))
}
