//! Module resolution for the require loader.
//!
//! Resolves modules and their declared dependencies against a filesystem
//! module repository, keeping exactly one version of each module active per
//! session.
//!
//! # Architecture
//!
//! - **Versions**: constraint parsing and matching (`2.3`, `2.3+`, named)
//! - **Repository**: candidate discovery (local builds, named versions,
//!   default-version hints, released versions, system libraries)
//! - **Session**: the recursive resolve-then-load walk, the loaded-module
//!   record, and the published search paths
//!
//! Actual loading is delegated to a [`Loader`] supplied by the host.

pub mod config;
pub mod error;
pub mod loaded;
pub mod loader;
pub mod manifest;
pub mod name;
pub mod publish;
pub mod repository;
pub mod resolution;
pub mod tree;
pub mod version;

#[cfg(test)]
mod testing;

// Re-exports for convenience.
pub use config::{RepositorySettings, RequireConfig};
pub use error::{ErrorKind, RequireError, Result};
pub use loaded::{LoadedModule, LoadedModules};
pub use loader::{DefinitionLoader, LibraryLoader, LoadError, LoadEvent, Loader, RecordingLoader};
pub use manifest::{DefaultVersions, DependencyEntry, DependencyManifest, ManifestError};
pub use publish::Publication;
pub use repository::{Candidate, InstalledVersion, Origin, Repository, VersionInventory};
pub use resolution::{HostPhase, ResolvedModule, Session};
pub use tree::{format_loaded, format_tree};
pub use version::{is_numeric_expression, Exactness, Version, VersionError, VersionSpec};
