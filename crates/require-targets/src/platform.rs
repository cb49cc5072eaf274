//! Complete platform model.
//!
//! Combines the base version layer, the target architecture tag, and the OS
//! family derived from it.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::environment::OsFamily;
use crate::error::{Result, TargetError};
use crate::layout::ModuleLayout;

/// The platform modules are resolved for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Platform {
    /// Base framework version every build is nested under (e.g. "3.15.4").
    pub base_version: String,
    /// Target architecture tag (e.g. "linux-x86_64").
    pub target_arch: String,
    /// OS family derived from the architecture tag.
    pub os: OsFamily,
}

impl Platform {
    /// Compose a platform from a base version and an architecture tag.
    pub fn compose(base_version: impl Into<String>, target_arch: impl Into<String>) -> Result<Self> {
        let base_version = base_version.into();
        let target_arch = target_arch.into();
        if base_version.is_empty() {
            return Err(TargetError::Validation {
                detail: "base version is empty".to_string(),
            });
        }
        if base_version.contains(['/', '\\']) || target_arch.contains(['/', '\\']) {
            return Err(TargetError::Validation {
                detail: format!("platform '{base_version}/{target_arch}' contains a path separator"),
            });
        }
        let os = OsFamily::from_arch(&target_arch)?;
        Ok(Self {
            base_version,
            target_arch,
            os,
        })
    }

    /// The platform of the running host for the given base version.
    pub fn host(base_version: impl Into<String>) -> Result<Self> {
        Self::compose(base_version, host_arch())
    }

    /// Installation layout of `module` rooted at a version directory.
    pub fn layout(&self, version_dir: impl Into<PathBuf>, module: &str) -> ModuleLayout {
        ModuleLayout::new(version_dir.into(), module, self.clone())
    }

    /// Name of the per-architecture default-version hint file.
    pub fn arch_hint_file_name(&self) -> String {
        format!("default.{}.dep", self.target_arch)
    }

    /// Name of the init entry point called after a module's definitions load.
    pub fn init_symbol(module: &str) -> String {
        format!("{module}_registerRecordDeviceDriver")
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.target_arch, self.base_version)
    }
}

/// Architecture tag of the running host, in the `<os>-<cpu>` naming scheme.
pub fn host_arch() -> &'static str {
    if cfg!(target_os = "windows") {
        if cfg!(target_pointer_width = "64") {
            "windows-x64"
        } else {
            "win32-x86"
        }
    } else if cfg!(target_os = "macos") {
        if cfg!(target_arch = "aarch64") {
            "darwin-aarch64"
        } else {
            "darwin-x86"
        }
    } else if cfg!(target_arch = "x86_64") {
        "linux-x86_64"
    } else if cfg!(target_arch = "aarch64") {
        "linux-aarch64"
    } else if cfg!(target_arch = "arm") {
        "linux-arm"
    } else {
        "linux-x86"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_derives_os() {
        let p = Platform::compose("3.15.4", "vxWorks-ppc604").unwrap();
        assert_eq!(p.os, OsFamily::VxWorks);
        assert_eq!(p.arch_hint_file_name(), "default.vxWorks-ppc604.dep");
    }

    #[test]
    fn host_platform_is_consistent() {
        let p = Platform::host("7.0.7").unwrap();
        assert_eq!(p.target_arch, host_arch());
        assert_eq!(p.base_version, "7.0.7");
    }

    #[test]
    fn empty_base_version_rejected() {
        assert!(Platform::compose("", "linux-x86_64").is_err());
    }

    #[test]
    fn path_like_components_rejected() {
        assert!(Platform::compose("3.15/..", "linux-x86_64").is_err());
        assert!(Platform::compose("3.15.4", "linux/x86").is_err());
    }

    #[test]
    fn init_symbol_name() {
        assert_eq!(Platform::init_symbol("asyn"), "asyn_registerRecordDeviceDriver");
    }
}
