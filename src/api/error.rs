//! Typed failures of the tool's REST endpoints

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("403 Forbidden for {url}")]
    Forbidden { url: String },
    #[error("HTTP {status} {status_text} for {url}: {body}")]
    Http {
        status: u16,
        status_text: String,
        url: String,
        body: String,
    },
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// HTTP status, 0 when no response was received.
    pub fn status(&self) -> u16 {
        match self {
            ClientError::Forbidden { .. } => 403,
            ClientError::Http { status, .. } => *status,
            ClientError::Network(e) => e.status().map_or(0, |s| s.as_u16()),
            ClientError::Decode { .. } => 200,
        }
    }

    pub fn status_text(&self) -> String {
        match self {
            ClientError::Forbidden { .. } => "Forbidden".to_string(),
            ClientError::Http { status_text, .. } => status_text.clone(),
            ClientError::Network(e) if e.is_timeout() => "timeout".to_string(),
            ClientError::Network(_) => "error".to_string(),
            ClientError::Decode { .. } => "parsererror".to_string(),
        }
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, ClientError::Forbidden { .. })
    }
}

/// Map a non-2xx status code to a client error.
pub fn status_error(status: reqwest::StatusCode, url: &str, body: String) -> ClientError {
    if status == reqwest::StatusCode::FORBIDDEN {
        return ClientError::Forbidden {
            url: url.to_string(),
        };
    }
    ClientError::Http {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or("").to_string(),
        url: url.to_string(),
        body,
    }
}
