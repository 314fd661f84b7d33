use crate::types::{Category, Price};

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Failures raised by session operations.
///
/// None of these are fatal: the coordinator logs them and drops the event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("join requires a non-empty name and avatar")]
    InvalidJoin,

    #[error("only an admin can {0}")]
    Unauthorized(&'static str),

    #[error("inconsistent state: {0}")]
    InconsistentState(String),

    #[error("no question found for {category} / {price}")]
    ContentLookupFailure { category: Category, price: Price },
}

/// Errors that can occur while loading the question bank
#[derive(Debug, thiserror::Error)]
pub enum QuestionBankError {
    #[error("failed to read question bank: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse question bank: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("category {category} lists price {price} more than once")]
    DuplicatePrice { category: Category, price: Price },
}
