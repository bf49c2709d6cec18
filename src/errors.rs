/*!
 * Error types for the scriptcast library.
 *
 * Parsing, name resolution and registry building are total and never fail.
 * The only error the core surfaces is a decode failure; the remaining types
 * cover the generation client and the command-line wrapper.
 */

use thiserror::Error;

/// Errors raised when a generation response yields nothing usable
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Every recovery tier ran and none produced a valid record
    #[error("No recoverable records after {tiers_attempted} tier(s): {reason}")]
    NoRecoverableRecords {
        /// Number of tiers that were attempted
        tiers_attempted: usize,
        /// Description of the last failure
        reason: String,
    },
}

/// Errors that can occur when talking to a generation client
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Error when making a request fails
    #[error("Generation request failed: {0}")]
    RequestFailed(String),

    /// Error returned by the service itself
    #[error("Service responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP-like status code
        status_code: u16,
        /// Error message from the service
        message: String,
    },

    /// The request was cancelled or timed out before a response arrived
    #[error("Request cancelled: {0}")]
    Cancelled(String),
}

/// Errors that can occur while casting a single batch
#[derive(Error, Debug, Clone)]
pub enum CastingError {
    /// Error from the generation client
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error decoding the response
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from casting
    #[error("Casting error: {0}")]
    Casting(#[from] CastingError),

    /// Error from decoding
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
