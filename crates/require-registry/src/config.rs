//! Resolver configuration.
//!
//! Settings are layered: an optional `require.toml` file, then environment
//! variables, then explicit overrides (command-line flags).
//!
//! ```toml
//! [repository]
//! modules-path = "/opt/epics/modules"
//! base-path = "/opt/epics/base-3.15.4"
//! target-arch = "linux-x86_64"
//! module-include-path = "/usr/lib:/opt/lib"
//! ```

use std::path::{Path, PathBuf};

use require_targets::{Platform, SearchPath};
use serde::{Deserialize, Serialize};

use crate::error::{RequireError, Result};

/// Default name of the configuration file.
pub const CONFIG_FILE: &str = "require.toml";

pub const ENV_MODULES_PATH: &str = "EPICS_MODULES_PATH";
pub const ENV_BASE: &str = "EPICS_BASE";
pub const ENV_BASE_VERSION: &str = "EPICS_BASE_VERSION";
pub const ENV_HOST_ARCH: &str = "EPICS_HOST_ARCH";
pub const ENV_MODULE_INCLUDE_PATH: &str = "EPICS_MODULE_INCLUDE_PATH";

/// One layer of settings. Unset fields defer to lower layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RepositorySettings {
    /// Root of the installed module repository.
    pub modules_path: Option<PathBuf>,
    /// Base installation; hint files live in its `configure/` directory.
    pub base_path: Option<PathBuf>,
    pub base_version: Option<String>,
    pub target_arch: Option<String>,
    /// Search path for system libraries.
    pub module_include_path: Option<String>,
    /// Directory scanned for local builds.
    pub local_modules_dir: Option<PathBuf>,
    /// Build output directory inside each local module.
    pub build_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    repository: RepositorySettings,
}

impl RepositorySettings {
    /// Read the `[repository]` table of a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| RequireError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|detail| RequireError::Config {
            detail: format!("{}: {detail}", path.display()),
        })
    }

    fn from_toml(text: &str) -> std::result::Result<Self, String> {
        toml::from_str::<ConfigFile>(text)
            .map(|file| file.repository)
            .map_err(|e| e.to_string())
    }

    /// Settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Settings from a variable lookup. Empty values count as unset.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| var(key).filter(|v| !v.is_empty());
        Self {
            modules_path: var(ENV_MODULES_PATH).map(PathBuf::from),
            base_path: var(ENV_BASE).map(PathBuf::from),
            base_version: var(ENV_BASE_VERSION),
            target_arch: var(ENV_HOST_ARCH),
            module_include_path: var(ENV_MODULE_INCLUDE_PATH),
            local_modules_dir: None,
            build_dir: None,
        }
    }

    /// Overlay `other` on top of `self`; fields set in `other` win.
    pub fn merge(self, other: Self) -> Self {
        Self {
            modules_path: other.modules_path.or(self.modules_path),
            base_path: other.base_path.or(self.base_path),
            base_version: other.base_version.or(self.base_version),
            target_arch: other.target_arch.or(self.target_arch),
            module_include_path: other.module_include_path.or(self.module_include_path),
            local_modules_dir: other.local_modules_dir.or(self.local_modules_dir),
            build_dir: other.build_dir.or(self.build_dir),
        }
    }

    /// Fill defaults and validate.
    pub fn resolve(self) -> Result<RequireConfig> {
        let modules_path = self.modules_path.ok_or_else(|| RequireError::Config {
            detail: format!("no module repository configured (set {ENV_MODULES_PATH} or modules-path)"),
        })?;

        let base_version = self
            .base_version
            .or_else(|| self.base_path.as_deref().and_then(version_from_base_path))
            .ok_or_else(|| RequireError::Config {
                detail: format!(
                    "base version unknown (set {ENV_BASE_VERSION}, or point {ENV_BASE} at a base-<version> directory)"
                ),
            })?;
        let platform = match self.target_arch {
            Some(arch) => Platform::compose(base_version, arch)?,
            None => Platform::host(base_version)?,
        };

        let module_include_path =
            SearchPath::parse(self.module_include_path.as_deref().unwrap_or("."), platform.os);

        Ok(RequireConfig {
            modules_path,
            base_path: self.base_path,
            platform,
            module_include_path,
            local_modules_dir: self.local_modules_dir.unwrap_or_else(|| PathBuf::from("modules")),
            build_dir: self.build_dir.unwrap_or_else(|| "builddir".to_string()),
        })
    }
}

/// Complete configuration of a resolution session.
#[derive(Debug, Clone)]
pub struct RequireConfig {
    pub modules_path: PathBuf,
    pub base_path: Option<PathBuf>,
    pub platform: Platform,
    pub module_include_path: SearchPath,
    pub local_modules_dir: PathBuf,
    pub build_dir: String,
}

impl RequireConfig {
    /// Load configuration: `file` (if it exists), then the environment, then
    /// `overrides`.
    pub fn load(file: Option<&Path>, overrides: RepositorySettings) -> Result<Self> {
        let from_file = match file {
            Some(path) if path.exists() => RepositorySettings::from_file(path)?,
            _ => RepositorySettings::default(),
        };
        from_file
            .merge(RepositorySettings::from_env())
            .merge(overrides)
            .resolve()
    }
}

/// `/opt/epics/base-3.15.4` → `3.15.4`.
fn version_from_base_path(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    name.strip_prefix("base-")
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
