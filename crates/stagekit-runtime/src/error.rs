use std::fmt;

/// Result type for stagekit-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer.
///
/// Every variant maps to a message key for the dictionary, so user-visible
/// text never hard-codes English in the core.
#[derive(Debug)]
pub enum Error {
    /// Types layer error
    Types(stagekit_types::Error),

    /// No response arrived at all
    Transport(String),

    /// A 200 response whose body did not parse as a status record
    StatusInvalid(String),

    /// The resource does not exist; `editor` distinguishes editor-shaped
    /// pages for the message key
    NotFound { editor: bool },

    /// Any other non-2xx status response
    FailedStatus(u16),

    /// Configuration error
    Config(String),
}

impl Error {
    /// Dictionary key for the user-visible message.
    pub fn message_key(&self) -> String {
        match self {
            Error::Types(_) | Error::StatusInvalid(_) => "error_status_invalid".to_string(),
            Error::Transport(_) => "error_status_fatal".to_string(),
            Error::NotFound { editor: true } => "error_status_404_document".to_string(),
            Error::NotFound { editor: false } => "error_status_404_content".to_string(),
            Error::FailedStatus(code) => format!("error_status_{}", code),
            Error::Config(_) => "error_config".to_string(),
        }
    }

    /// Whether acknowledging this error must tear the session down.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Error::NotFound { .. } | Error::StatusInvalid(_) | Error::Types(_)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Types(err) => write!(f, "Types error: {}", err),
            Error::Transport(msg) => write!(f, "Transport error: {}", msg),
            Error::StatusInvalid(msg) => write!(f, "Invalid status response: {}", msg),
            Error::NotFound { editor: true } => write!(f, "Document is not connected to a project"),
            Error::NotFound { editor: false } => write!(f, "Resource not found"),
            Error::FailedStatus(code) => write!(f, "Status fetch failed: {}", code),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Types(err) => Some(err),
            Error::Transport(_)
            | Error::StatusInvalid(_)
            | Error::NotFound { .. }
            | Error::FailedStatus(_)
            | Error::Config(_) => None,
        }
    }
}

impl From<stagekit_types::Error> for Error {
    fn from(err: stagekit_types::Error) -> Self {
        Error::Types(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_keys() {
        assert_eq!(Error::FailedStatus(502).message_key(), "error_status_502");
        assert_eq!(
            Error::NotFound { editor: true }.message_key(),
            "error_status_404_document"
        );
        assert_eq!(
            Error::NotFound { editor: false }.message_key(),
            "error_status_404_content"
        );
    }

    #[test]
    fn terminal_classification() {
        assert!(Error::NotFound { editor: false }.is_terminal());
        assert!(Error::StatusInvalid("bad json".to_string()).is_terminal());
        assert!(!Error::FailedStatus(503).is_terminal());
        assert!(!Error::Transport("offline".to_string()).is_terminal());
    }
}
