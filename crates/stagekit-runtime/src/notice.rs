//! User-facing notices. Rendering is the host's concern; the core only
//! decides level, stickiness and the teardown-on-acknowledge policy.

use stagekit_engine::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

impl From<Severity> for NoticeLevel {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Info => NoticeLevel::Info,
            Severity::Warning => NoticeLevel::Warning,
            Severity::Fatal => NoticeLevel::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    /// Dictionary key of the user-visible message.
    pub message_key: String,
    /// Raw detail appended to the message (e.g. an `x-error` text).
    pub detail: Option<String>,
    /// Sticky notices stay until dismissed.
    pub sticky: bool,
    /// Acknowledging a terminal notice tears the session down.
    pub terminal: bool,
}

impl Notice {
    pub fn info(message_key: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            message_key: message_key.into(),
            detail: None,
            sticky: false,
            terminal: false,
        }
    }

    pub fn warning(message_key: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Warning,
            message_key: message_key.into(),
            detail: None,
            sticky: true,
            terminal: false,
        }
    }

    pub fn fatal(message_key: impl Into<String>, terminal: bool) -> Self {
        Notice {
            level: NoticeLevel::Error,
            message_key: message_key.into(),
            detail: None,
            sticky: true,
            terminal,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
