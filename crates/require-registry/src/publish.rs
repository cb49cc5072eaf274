//! Key/value side-output of resolution.
//!
//! Every registered module publishes its version and location, and appends its
//! optional directories to the search paths other tooling reads.

use std::collections::BTreeMap;
use std::path::Path;

use require_targets::{ModuleLayout, OsFamily, SearchPath};
use serde::Serialize;

/// Search path for record templates.
pub const DB_INCLUDE_PATH: &str = "EPICS_DB_INCLUDE_PATH";
/// Search path for startup snippets.
pub const STARTUP_INCLUDE_PATH: &str = "REQUIRE_STARTUP_INCLUDE_PATH";
/// Search path for auxiliary executables.
pub const BIN_INCLUDE_PATH: &str = "REQUIRE_BIN_INCLUDE_PATH";
/// Search path for protocol files.
pub const PROTOCOL_PATH: &str = "STREAM_PROTOCOL_PATH";

/// Ordered map of published keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Publication {
    entries: BTreeMap<String, String>,
}

impl Publication {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version_key(module: &str) -> String {
        format!("REQUIRE_{module}_VERSION")
    }

    pub fn path_key(module: &str) -> String {
        format!("REQUIRE_{module}_PATH")
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Publish the version and location of a newly registered module.
    pub fn module(&mut self, module: &str, version: &str, path: &Path) {
        self.set(Self::version_key(module), version);
        self.set(Self::path_key(module), path.to_string_lossy());
    }

    /// Append `dir` to the search path stored under `key`. A key with no
    /// prior value starts with the current directory.
    pub fn append_path(&mut self, key: &str, dir: &Path, os: OsFamily) {
        let mut path = SearchPath::or_current_dir(self.get(key), os);
        path.push(dir);
        self.set(key, path.to_string());
    }

    /// Append each existing optional directory of `layout` to its search path.
    pub fn include_dirs(&mut self, layout: &ModuleLayout) {
        let os = layout.platform().os;
        for (key, dir) in [
            (DB_INCLUDE_PATH, layout.db_dir()),
            (STARTUP_INCLUDE_PATH, layout.startup_dir()),
            (BIN_INCLUDE_PATH, layout.bin_dir()),
            (PROTOCOL_PATH, layout.misc_dir()),
        ] {
            if dir.is_dir() {
                tracing::debug!(key, dir = %dir.display(), "adding to search path");
                self.append_path(key, &dir, os);
            }
        }
    }

    /// The search path stored under `key`, if published.
    pub fn search_path(&self, key: &str, os: OsFamily) -> Option<SearchPath> {
        self.get(key).map(|text| SearchPath::parse(text, os))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as POSIX shell `export` lines.
    pub fn to_shell_exports(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("export {k}='{}'\n", v.replace('\'', r"'\''")))
            .collect()
    }
}
