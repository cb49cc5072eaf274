//! The record of modules already active in a session.

use serde::Serialize;

/// One active module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadedModule {
    pub name: String,
    /// The version text actually resolved: a release number, `local`,
    /// `system`, or a named build tag.
    pub version: String,
}

/// Append-only list of active modules, in load order.
#[derive(Debug, Clone, Default)]
pub struct LoadedModules {
    records: Vec<LoadedModule>,
}

impl LoadedModules {
    pub fn new() -> Self {
        Self::default()
    }

    /// The loaded version of `name`, matched exactly.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.records
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.version.as_str())
    }

    /// Append a record. Callers check for an existing entry first.
    pub(crate) fn register(&mut self, name: &str, version: &str) {
        self.records.push(LoadedModule {
            name: name.to_string(),
            version: version.to_string(),
        });
    }

    /// Records in load order.
    pub fn iter(&self) -> impl Iterator<Item = &LoadedModule> {
        self.records.iter()
    }

    /// Records whose name contains `pattern`, most recently loaded first.
    pub fn show(&self, pattern: Option<&str>) -> Vec<&LoadedModule> {
        self.records
            .iter()
            .rev()
            .filter(|r| pattern.is_none_or(|p| r.name.contains(p)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
