//! Delimited search-path lists.

use std::path::{Path, PathBuf};

use crate::environment::OsFamily;

/// An ordered list of directories joined by the platform separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    separator: char,
    entries: Vec<String>,
}

impl SearchPath {
    /// An empty search path using `os`'s separator.
    pub fn new(os: OsFamily) -> Self {
        Self {
            separator: os.path_separator(),
            entries: Vec::new(),
        }
    }

    /// Split `text` on `os`'s separator. Empty elements are dropped.
    pub fn parse(text: &str, os: OsFamily) -> Self {
        let separator = os.path_separator();
        let entries = text
            .split(separator)
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .collect();
        Self { separator, entries }
    }

    /// Parse `existing`, or start a fresh list containing only the current
    /// directory when there is no prior value.
    pub fn or_current_dir(existing: Option<&str>, os: OsFamily) -> Self {
        match existing {
            Some(text) => Self::parse(text, os),
            None => {
                let mut path = Self::new(os);
                path.entries.push(".".to_string());
                path
            }
        }
    }

    /// Append a directory to the end of the list.
    pub fn push(&mut self, dir: &Path) {
        self.entries.push(dir.to_string_lossy().into_owned());
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// The first `<entry>/<file>` that exists, in list order.
    pub fn find(&self, file: &str) -> Option<PathBuf> {
        self.entries
            .iter()
            .map(|dir| Path::new(dir).join(file))
            .find(|candidate| candidate.exists())
    }
}

impl std::fmt::Display for SearchPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut sep = String::new();
        for entry in &self.entries {
            write!(f, "{sep}{entry}")?;
            sep = self.separator.to_string();
        }
        Ok(())
    }
}
