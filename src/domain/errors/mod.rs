// Domain errors - Error types for the domain layer

use thiserror::Error;

/// Domain-specific error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Submit attempted before any video was opened
    #[error("Select a video first")]
    NoFileSelected,

    /// In-point and out-point are the same position
    #[error("Cannot trim: the start and end points are the same")]
    EmptyRange,

    /// In-point lies after the out-point
    #[error("Cannot trim: the start point is after the end point")]
    InvertedRange,

    /// The selected video could not be opened
    #[error("Failed to load video: {0}")]
    LoadFailed(String),

    /// A trim is already running
    #[error("A trim is already in progress")]
    Busy,

    /// Invalid arguments provided
    #[error("Bad arguments: {0}")]
    BadArgs(String),

    /// The engine binary could not be started
    #[error("Engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The engine ran but reported failure
    #[error("Engine failed: {0}")]
    EngineFailed(String),

    /// Filesystem operation failed
    #[error("Filesystem error: {0}")]
    FsFail(String),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown media handle
    #[error("Unknown media handle: {0}")]
    UnknownHandle(String),
}

impl DomainError {
    /// True for the conditions the user is expected to fix themselves
    pub fn is_user_alert(&self) -> bool {
        matches!(
            self,
            DomainError::NoFileSelected
                | DomainError::EmptyRange
                | DomainError::InvertedRange
                | DomainError::LoadFailed(_)
                | DomainError::Busy
        )
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::FsFail(err.to_string())
    }
}
