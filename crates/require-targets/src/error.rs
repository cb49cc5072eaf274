//! Error types for platform operations.

use std::path::PathBuf;

/// Errors that can occur while describing or inspecting a platform.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    /// The architecture tag does not name a known operating system family.
    #[error("unknown target architecture '{arch}'")]
    UnknownArch {
        /// The rejected architecture tag.
        arch: String,
    },

    /// A platform field is empty or malformed.
    #[error("validation error: {detail}")]
    Validation {
        /// Description of the validation failure.
        detail: String,
    },

    /// I/O error while inspecting an installation tree.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        /// The path being inspected.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
}

/// Result type for platform operations.
pub type Result<T> = std::result::Result<T, TargetError>;
