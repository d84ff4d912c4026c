use std::fmt;

// Domain-level errors for the pairing workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchError {
    InvalidInput,
    StoreUnavailable,
    Internal,
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::InvalidInput => write!(f, "requesterId is required"),
            MatchError::StoreUnavailable => write!(f, "queue store unavailable"),
            MatchError::Internal => write!(f, "internal error"),
        }
    }
}

impl std::error::Error for MatchError {}

// Failures reported by queue and assignment store adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Unavailable(String),
    Timeout,
    Corrupt(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(detail) => write!(f, "store unavailable: {detail}"),
            StoreError::Timeout => write!(f, "store call timed out"),
            StoreError::Corrupt(detail) => write!(f, "corrupt store record: {detail}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<StoreError> for MatchError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(_) | StoreError::Timeout => MatchError::StoreUnavailable,
            StoreError::Corrupt(_) => MatchError::Internal,
        }
    }
}
