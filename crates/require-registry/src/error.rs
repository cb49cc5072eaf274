//! Resolver error types.

use std::path::PathBuf;

use require_targets::TargetError;
use serde::Serialize;

use crate::manifest::ManifestError;
use crate::version::VersionError;

/// Errors that can occur while resolving and loading modules.
#[derive(Debug, thiserror::Error)]
pub enum RequireError {
    /// A module name or version expression is not acceptable.
    #[error("invalid input: {detail}")]
    Validation { detail: String },

    /// Version text could not be parsed.
    #[error(transparent)]
    Version(#[from] VersionError),

    /// No installation, hint or system library satisfies the request.
    #[error("module {module}{} not available for this platform", describe_request(.requested))]
    NotFound { module: String, requested: String },

    /// The module is already loaded at an incompatible version.
    #[error("module {module} version {loaded} already loaded, requested {requested}")]
    Conflict {
        module: String,
        loaded: String,
        requested: String,
    },

    /// A dependency or hint file is malformed or unreadable.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// A loader collaborator rejected an artifact.
    #[error("loading {module} from {} failed: {detail}", .path.display())]
    LoadFailure {
        module: String,
        path: PathBuf,
        detail: String,
    },

    /// A module depends on itself, directly or transitively.
    #[error("cyclic dependency: {}", .chain.join(" -> "))]
    CyclicDependency { chain: Vec<String> },

    /// Configuration is incomplete or inconsistent.
    #[error("configuration error: {detail}")]
    Config { detail: String },

    /// Platform description error.
    #[error(transparent)]
    Target(#[from] TargetError),

    /// Filesystem error while scanning the repository.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A failure during the host's startup phase; the startup sequence must
    /// not continue.
    #[error("aborting startup: {source}")]
    StartupAborted {
        module: String,
        #[source]
        source: Box<RequireError>,
    },
}

/// Coarse classification of a [`RequireError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Manifest,
    LoadFailure,
    CyclicDependency,
    Config,
    Io,
    StartupAborted,
}

impl RequireError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } | Self::Version(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Manifest(_) => ErrorKind::Manifest,
            Self::LoadFailure { .. } => ErrorKind::LoadFailure,
            Self::CyclicDependency { .. } => ErrorKind::CyclicDependency,
            Self::Config { .. } => ErrorKind::Config,
            Self::Target(TargetError::Io { .. }) | Self::Io { .. } => ErrorKind::Io,
            Self::Target(_) => ErrorKind::Config,
            Self::StartupAborted { .. } => ErrorKind::StartupAborted,
        }
    }

    /// Whether the host must stop its startup sequence.
    pub fn requests_abort(&self) -> bool {
        matches!(self, Self::StartupAborted { .. })
    }

    /// The underlying error, looking through a startup abort.
    pub fn root(&self) -> &RequireError {
        match self {
            Self::StartupAborted { source, .. } => source.root(),
            other => other,
        }
    }
}

fn describe_request(requested: &str) -> String {
    if requested.is_empty() {
        String::new()
    } else {
        format!(" version {requested}")
    }
}

/// Result type alias for resolver operations.
pub type Result<T> = std::result::Result<T, RequireError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_mentions_version_only_when_requested() {
        let any = RequireError::NotFound {
            module: "asyn".into(),
            requested: String::new(),
        };
        assert_eq!(any.to_string(), "module asyn not available for this platform");

        let pinned = RequireError::NotFound {
            module: "asyn".into(),
            requested: "4.2+".into(),
        };
        assert_eq!(
            pinned.to_string(),
            "module asyn version 4.2+ not available for this platform"
        );
    }

    #[test]
    fn startup_abort_wraps_and_classifies() {
        let err = RequireError::StartupAborted {
            module: "foo".into(),
            source: Box::new(RequireError::CyclicDependency {
                chain: vec!["foo".into(), "bar".into(), "foo".into()],
            }),
        };
        assert!(err.requests_abort());
        assert_eq!(err.kind(), ErrorKind::StartupAborted);
        assert_eq!(err.root().kind(), ErrorKind::CyclicDependency);
        assert_eq!(
            err.to_string(),
            "aborting startup: cyclic dependency: foo -> bar -> foo"
        );
    }

    #[test]
    fn version_errors_are_validation() {
        let err: RequireError = VersionError::Negative { text: "-1".into() }.into();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(!err.requests_abort());
    }
}
