//! Error types for mpm-merge
//!
//! The grouping and planning core never fails; everything here comes from
//! configuration or the catalog collaborator.

use thiserror::Error;

/// Run-level error type
#[derive(Debug, Error)]
pub enum MergeError {
    /// Transport failure or non-success HTTP status
    #[error("HTTP error talking to Stash GraphQL: {0}")]
    Http(String),

    /// The server answered with a GraphQL `errors` array
    #[error("GraphQL errors: {0}")]
    GraphQl(String),

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    Decode(String),

    /// Connection test failed before any work was done
    #[error("✗ Connection failed: {0}")]
    Connection(String),

    /// Configuration could not be resolved
    #[error("Configuration error: {0}")]
    Config(String),

    /// mpm-common error
    #[error(transparent)]
    Common(#[from] mpm_common::Error),
}

impl MergeError {
    /// Process exit code reported to the plugin host
    pub fn exit_code(&self) -> i32 {
        match self {
            MergeError::Http(_) => 2,
            _ => 1,
        }
    }
}

impl From<reqwest::Error> for MergeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            MergeError::Decode(err.to_string())
        } else {
            MergeError::Http(err.to_string())
        }
    }
}

/// Result type for mpm-merge operations
pub type MergeResult<T> = Result<T, MergeError>;
