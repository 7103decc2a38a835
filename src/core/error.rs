use thiserror::Error;

/// Input the user can fix; reported as a notice and never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Message content cannot be empty")]
    EmptyContent,
    #[error("No match for \"{target}\"")]
    UnresolvedTarget { target: String },
    #[error("\"{url}\" is not a valid URL")]
    MalformedUrl { url: String },
    #[error("\"{input}\" is not a valid time in the future")]
    InvalidTime { input: String },
    #[error("{field} is required")]
    MissingField { field: String },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage serde: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The user declined a confirmation. Callers treat this as a no-op.
    #[error("execution canceled")]
    Canceled,
    #[error("loop detected at {command_id}")]
    LoopDetected { command_id: String },
    #[error("command not found: {command_id}")]
    CommandNotFound { command_id: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{message}")]
    Handler { message: String },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ExecutionError {
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler {
            message: message.into(),
        }
    }

    pub fn is_cancel(&self) -> bool {
        matches!(self, Self::Canceled)
    }
}
