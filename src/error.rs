//! Global error handling for coursesync
//!
//! This module provides a centralized error type that can represent errors
//! from all modules in the project.

use std::io;
use thiserror::Error;

use crate::remote::RemoteError;
use crate::types::FolderId;

/// Global error type for coursesync operations
#[derive(Error, Debug)]
pub enum SyncError {
    /// Remote API or transfer errors
    #[error("Transfer error: {0}")]
    Remote(#[from] RemoteError),

    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A file or folder references a folder id missing from the course's folder map
    #[error("Unknown folder: {0}")]
    UnknownFolder(FolderId),

    /// Walking parent links revisited a folder
    #[error("Folder cycle detected at folder {0}")]
    FolderCycle(FolderId),

    /// The run was interrupted
    #[error("cancelled")]
    Cancelled,

    /// Unexpected error
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Specialized Result type for coursesync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Creates a SyncError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::SyncError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

// Lets `main` keep an io::Result signature
impl From<SyncError> for io::Error {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Io(e) => e,
            other => io::Error::new(io::ErrorKind::Other, other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn needs_positive(n: usize) -> Result<usize> {
        crate::ensure!(n > 0, Config, "value must be positive, got {}", n);
        Ok(n)
    }

    #[test]
    fn test_ensure_macro() {
        assert_eq!(needs_positive(3).unwrap(), 3);
        let err = needs_positive(0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: value must be positive, got 0"
        );
    }

    #[test]
    fn test_io_error_passthrough() {
        let err = SyncError::Io(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let io_err: io::Error = err.into();
        assert_eq!(io_err.kind(), io::ErrorKind::NotFound);
    }
}
