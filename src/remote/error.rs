/*!
 * Error types for remote listing and transfer
 */

use thiserror::Error;

/// Errors that can occur while talking to the remote
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Transport-level failure (connect, TLS, timeout, body read)
    #[error("Request failed: {0}")]
    Request(String),

    /// The remote answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Response body could not be decoded
    #[error("Invalid response: {0}")]
    Json(String),

    /// IO error while writing the payload
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload length differs from the size the listing reported
    #[error("Short transfer: got {written} of {expected} bytes")]
    Truncated {
        /// Size from the listing
        expected: u64,
        /// Bytes actually received
        written: u64,
    },

    /// Transfer interrupted by cancellation
    #[error("cancelled")]
    Cancelled,
}

/// Specialized Result type for remote operations
pub type RemoteResult<T> = Result<T, RemoteError>;

impl From<reqwest::Error> for RemoteError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            RemoteError::Json(error.to_string())
        } else {
            RemoteError::Request(error.to_string())
        }
    }
}
