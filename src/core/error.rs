//! Error taxonomy for fund lookups, window assembly and statistics.

use thiserror::Error;

/// Errors raised while answering a single statistics request.
///
/// Every variant carries enough context (fund id, page, operation) to
/// diagnose the failure from the message alone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FundError {
    /// A request was rejected before any I/O took place.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The fund identifier is absent from the provider's fund directory.
    #[error("No matching result for fund id: {0}")]
    FundNotFound(String),

    /// The provider ran out of pages before the window could be filled.
    #[error(
        "Insufficient history for fund {fund_id}: requested {requested} days, only {available} available"
    )]
    InsufficientHistory {
        fund_id: String,
        requested: usize,
        available: usize,
    },

    /// Network failure or non-success response from the provider.
    #[error("Network error during {operation}: {message}")]
    Transport { operation: String, message: String },

    /// Provider response did not match the expected shape.
    #[error("Failed to decode response for {operation}: {message}")]
    Decode { operation: String, message: String },

    /// Cache store read or write fault.
    #[error("Cache storage error during {operation}: {message}")]
    Storage { operation: String, message: String },

    /// Aggregates were requested over an empty sequence.
    #[error("Empty input: {0}")]
    EmptyInput(String),
}

impl FundError {
    pub fn transport(operation: impl Into<String>, err: impl std::fmt::Display) -> Self {
        FundError::Transport {
            operation: operation.into(),
            message: err.to_string(),
        }
    }

    pub fn decode(operation: impl Into<String>, err: impl std::fmt::Display) -> Self {
        FundError::Decode {
            operation: operation.into(),
            message: err.to_string(),
        }
    }

    pub fn storage(operation: impl Into<String>, err: impl std::fmt::Display) -> Self {
        FundError::Storage {
            operation: operation.into(),
            message: err.to_string(),
        }
    }

    /// Whether a caller may reasonably retry the failed operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FundError::Transport { .. })
    }
}

pub type Result<T> = std::result::Result<T, FundError>;
