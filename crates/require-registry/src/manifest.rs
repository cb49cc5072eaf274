//! Dependency manifests and default-version hint tables.
//!
//! Both are line-oriented text files:
//! ```text
//! # comment
//! asyn,4.2+
//! calc 3.7
//! sequencer
//! ```
//! A dependency line is a module name, optionally followed by a comma and/or
//! whitespace and a version expression. Hint lines are `name version`.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::warn;

use crate::name;
use crate::version::VersionSpec;

/// Errors from reading dependency or hint files.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// A line could not be understood.
    #[error("{}:{line_no}: {detail}", .path.display())]
    Malformed {
        path: PathBuf,
        line_no: usize,
        detail: String,
    },

    /// The file could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One declared dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyEntry {
    pub name: String,
    /// Version expression; empty means any version.
    pub version: String,
}

/// The dependency list of one installed module version.
#[derive(Debug, Clone, Default)]
pub struct DependencyManifest {
    pub entries: Vec<DependencyEntry>,
}

impl DependencyManifest {
    /// Read and parse the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = read(path)?;
        Self::parse(&text, path)
    }

    /// Parse manifest text; `path` is used for error reporting only.
    pub fn parse(text: &str, path: &Path) -> Result<Self, ManifestError> {
        let mut entries = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let malformed = |detail| ManifestError::Malformed {
                path: path.to_path_buf(),
                line_no: i + 1,
                detail,
            };
            if let Some((name, version)) = parse_line(line, true).map_err(malformed)? {
                entries.push(DependencyEntry { name, version });
            }
        }
        Ok(Self { entries })
    }
}

/// A repository-wide table of default versions.
///
/// Lines are checked lazily: a malformed line only fails lookups of the
/// module it names. Every other lookup skips it with a warning.
#[derive(Debug, Clone, Default)]
pub struct DefaultVersions {
    path: PathBuf,
    lines: Vec<String>,
}

impl DefaultVersions {
    /// Read the hint table at `path`. A missing file yields `None`.
    pub fn load(path: &Path) -> Result<Option<Self>, ManifestError> {
        if !path.exists() {
            return Ok(None);
        }
        let text = read(path)?;
        Ok(Some(Self::parse(&text, path)))
    }

    pub fn parse(text: &str, path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    /// The file this table was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The hinted version for `module`; the first line naming it wins.
    ///
    /// Fails only when that line is malformed.
    pub fn lookup(&self, module: &str) -> Result<Option<String>, ManifestError> {
        for (i, line) in self.lines.iter().enumerate() {
            match hint_line(line) {
                Ok(Some((name, version))) if name == module => return Ok(Some(version)),
                Ok(_) => {}
                Err(detail) if line_target(line) == module => {
                    return Err(self.malformed(i, detail));
                }
                Err(detail) => {
                    warn!(path = %self.path.display(), line = i + 1, %detail, "skipping default version");
                }
            }
        }
        Ok(None)
    }

    /// Every malformed line in the table.
    pub fn problems(&self) -> Vec<ManifestError> {
        self.lines
            .iter()
            .enumerate()
            .filter_map(|(i, line)| hint_line(line).err().map(|detail| self.malformed(i, detail)))
            .collect()
    }

    fn malformed(&self, index: usize, detail: String) -> ManifestError {
        ManifestError::Malformed {
            path: self.path.clone(),
            line_no: index + 1,
            detail,
        }
    }
}

/// One hint line as `(name, version)`; the version is required.
fn hint_line(line: &str) -> Result<Option<(String, String)>, String> {
    match parse_line(line, false)? {
        Some((name, version)) if version.is_empty() => {
            Err(format!("no default version given for '{name}'"))
        }
        other => Ok(other),
    }
}

/// The module a line is about, even when the rest of it is malformed.
fn line_target(line: &str) -> &str {
    line.trim_start()
        .split(|c: char| c.is_whitespace() || c == ',')
        .next()
        .unwrap_or("")
}

fn read(path: &Path) -> Result<String, ManifestError> {
    std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Split one line into `(name, version)`. Blank and comment lines yield
/// `None`.
fn parse_line(line: &str, allow_comma: bool) -> Result<Option<(String, String)>, String> {
    let line = line.trim_start();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let name_end = line
        .find(|c: char| c.is_whitespace() || (allow_comma && c == ','))
        .unwrap_or(line.len());
    let (module, mut rest) = line.split_at(name_end);
    name::check(module)?;

    rest = rest.trim_start();
    if allow_comma {
        if let Some(after_comma) = rest.strip_prefix(',') {
            rest = after_comma.trim_start();
        }
    }

    let mut tokens = rest.split_whitespace();
    let version = match tokens.next() {
        Some(token) if token.starts_with('#') => return Ok(Some((module.to_string(), String::new()))),
        Some(token) => token,
        None => "",
    };
    if let Some(extra) = tokens.next() {
        if !extra.starts_with('#') {
            return Err(format!("unexpected '{extra}' after version of '{module}'"));
        }
    }
    VersionSpec::parse(version).map_err(|e| e.to_string())?;

    Ok(Some((module.to_string(), version.to_string())))
}
