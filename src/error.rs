use thiserror::Error;

/// Failure categories surfaced by the results console.
///
/// Every variant is recoverable: the session turns it into a
/// [`Notification`](crate::notification::Notification) and keeps running.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// A directory or participant list could not be loaded.
    #[error("Error fetching {resource}: {message}")]
    Fetch {
        resource: &'static str,
        message: String,
    },

    /// An action was attempted without the context it needs.
    #[error("{0}")]
    Validation(String),

    /// The results store rejected a save batch.
    #[error("Error saving results: {0}")]
    Persistence(String),

    /// The spreadsheet could not be built or written.
    #[error("Error downloading results: {0}")]
    Export(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Fetch,
    Validation,
    Persistence,
    Export,
}

impl ConsoleError {
    pub fn fetch(resource: &'static str, message: impl Into<String>) -> Self {
        ConsoleError::Fetch {
            resource,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ConsoleError::Validation(message.into())
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            ConsoleError::Fetch { .. } => FailureKind::Fetch,
            ConsoleError::Validation(_) => FailureKind::Validation,
            ConsoleError::Persistence(_) => FailureKind::Persistence,
            ConsoleError::Export(_) => FailureKind::Export,
        }
    }
}
