//! User-facing messages with body de-duplication

use std::collections::HashSet;
use std::fmt;

use crate::api::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Information,
    Success,
    Warning,
    Error,
}

impl Severity {
    /// Parse the loose severity names the server uses for notices.
    pub fn from_level(level: &str) -> Self {
        match level.to_ascii_lowercase().as_str() {
            "success" => Severity::Success,
            "warn" | "warning" => Severity::Warning,
            "error" | "fail" => Severity::Error,
            _ => Severity::Information,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Information => "info",
            Severity::Success => "ok",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMessage {
    pub severity: Severity,
    pub title: Option<String>,
    pub body: String,
}

impl UserMessage {
    pub fn new(severity: Severity, body: impl Into<String>) -> Self {
        Self {
            severity,
            title: None,
            body: body.into(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl fmt::Display for UserMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.title {
            Some(title) if self.body.is_empty() => write!(f, "[{}] {}", self.severity, title),
            Some(title) => write!(f, "[{}] {}: {}", self.severity, title, self.body),
            None => write!(f, "[{}] {}", self.severity, self.body),
        }
    }
}

/// `Server response: <statusText> [Code: <status>]`, omitting whichever
/// part is missing.
pub fn describe_failure(status: u16, status_text: &str) -> String {
    if status == 0 && status_text.is_empty() {
        return String::new();
    }
    let mut description = String::from("Server response: ");
    description.push_str(status_text);
    if status != 0 {
        description.push_str(&format!(" [Code: {}]", status));
    }
    description
}

/// Error message for a failed request, titled with what was attempted.
pub fn failure_message(title: &str, err: &ClientError) -> UserMessage {
    UserMessage::new(Severity::Error, describe_failure(err.status(), &err.status_text()))
        .with_title(title)
}

/// Messages shown in the current view. A body is shown at most once until
/// the log is cleared.
#[derive(Debug, Default)]
pub struct MessageLog {
    seen: HashSet<String>,
    shown: Vec<UserMessage>,
}

impl MessageLog {
    /// Record `message`; returns it back if it is new and should be shown.
    pub fn push(&mut self, message: UserMessage) -> Option<&UserMessage> {
        if !self.seen.insert(message.body.clone()) {
            tracing::debug!("Suppressed duplicate message: {}", message.body);
            return None;
        }
        self.shown.push(message);
        self.shown.last()
    }

    pub fn messages(&self) -> &[UserMessage] {
        &self.shown
    }

    pub fn clear(&mut self) {
        self.seen.clear();
        self.shown.clear();
    }
}
