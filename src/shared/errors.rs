use thiserror::Error;

/// Common storage-related errors used across plugins.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse data: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Failed to create directory: {0}")]
    DirectoryError(String),
}

impl StorageError {
    pub fn directory(msg: impl Into<String>) -> Self {
        StorageError::DirectoryError(msg.into())
    }
}

/// Why the rate gate refused a metered call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    HardLimitReached,
    RateLimited,
}

/// Errors surfaced by command handlers.
///
/// The command layer matches on the variant to pick the user-facing
/// message; none of these ever terminate the process.
#[derive(Error, Debug)]
pub enum BotError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Rate limited: {0:?}")]
    RateLimited(DenyReason),

    #[error("{0}")]
    External(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl BotError {
    pub fn validation(msg: impl Into<String>) -> Self {
        BotError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        BotError::NotFound(msg.into())
    }

    pub fn external(msg: impl Into<String>) -> Self {
        BotError::External(msg.into())
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        BotError::PermissionDenied(msg.into())
    }
}

pub type BotResult<T> = Result<T, BotError>;
