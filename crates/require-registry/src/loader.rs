//! Loader collaborators.
//!
//! The resolver decides *what* to load; hosts decide *how*. A host with a
//! dynamic linker and a record database implements these traits; the
//! [`RecordingLoader`] default only checks artifacts and keeps a log.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// A loader rejected an artifact.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{detail}")]
pub struct LoadError {
    pub detail: String,
}

impl LoadError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Loads native shared libraries into the host.
pub trait LibraryLoader {
    fn load_library(&mut self, path: &Path) -> Result<(), LoadError>;
}

/// Loads record/device definitions and runs a module's registration entry
/// point.
pub trait DefinitionLoader {
    fn load_definitions(&mut self, path: &Path) -> Result<(), LoadError>;

    /// Call the registration function named `symbol`.
    fn call_init(&mut self, symbol: &str) -> Result<(), LoadError>;
}

/// Both loader roles, as one session collaborator.
pub trait Loader: LibraryLoader + DefinitionLoader {}

impl<T: LibraryLoader + DefinitionLoader> Loader for T {}

/// One call made to a [`RecordingLoader`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "kebab-case")]
pub enum LoadEvent {
    Library(PathBuf),
    Definitions(PathBuf),
    Init(String),
}

/// Default loader: verifies each artifact is a readable file and records the
/// calls in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingLoader {
    events: Vec<LoadEvent>,
}

impl RecordingLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[LoadEvent] {
        &self.events
    }
}

fn check_readable(path: &Path) -> Result<(), LoadError> {
    let meta = std::fs::metadata(path)
        .map_err(|e| LoadError::new(format!("{}: {e}", path.display())))?;
    if !meta.is_file() {
        return Err(LoadError::new(format!("{} is not a regular file", path.display())));
    }
    std::fs::File::open(path)
        .map(drop)
        .map_err(|e| LoadError::new(format!("{}: {e}", path.display())))
}

impl LibraryLoader for RecordingLoader {
    fn load_library(&mut self, path: &Path) -> Result<(), LoadError> {
        check_readable(path)?;
        self.events.push(LoadEvent::Library(path.to_path_buf()));
        Ok(())
    }
}

impl DefinitionLoader for RecordingLoader {
    fn load_definitions(&mut self, path: &Path) -> Result<(), LoadError> {
        check_readable(path)?;
        self.events.push(LoadEvent::Definitions(path.to_path_buf()));
        Ok(())
    }

    fn call_init(&mut self, symbol: &str) -> Result<(), LoadError> {
        self.events.push(LoadEvent::Init(symbol.to_string()));
        Ok(())
    }
}
