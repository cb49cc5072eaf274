//! Fixed on-disk layout of an installed module version.
//!
//! Layout:
//! ```text
//! <version-dir>/
//!   <base-version>/
//!     lib/<arch>/<module>.dep   : dependency manifest, marks the build as installed
//!     lib/<arch>/lib<module>.so : loadable library (name per OS family)
//!     dbd/<module>.dbd          : record/device definitions
//!     bin/<arch>/               : auxiliary executables
//!   db/                         : record templates
//!   startup/                    : startup snippets
//!   misc/                       : protocol and miscellaneous files
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Result, TargetError};
use crate::platform::Platform;

/// Paths inside one installed module version for one platform.
#[derive(Debug, Clone)]
pub struct ModuleLayout {
    dir: PathBuf,
    module: String,
    platform: Platform,
}

/// A (base version, architecture) pair a module version is installed for.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct InstalledPlatform {
    pub base_version: String,
    pub target_arch: String,
}

impl ModuleLayout {
    /// Create the layout for `module` installed at `dir`.
    pub fn new(dir: PathBuf, module: &str, platform: Platform) -> Self {
        Self {
            dir,
            module: module.to_string(),
            platform,
        }
    }

    /// The version directory this layout is rooted at.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    fn base_dir(&self) -> PathBuf {
        self.dir.join(&self.platform.base_version)
    }

    /// Per-architecture library directory.
    pub fn lib_dir(&self) -> PathBuf {
        self.base_dir().join("lib").join(&self.platform.target_arch)
    }

    /// The dependency manifest; its presence marks the build as installed.
    pub fn dep_file(&self) -> PathBuf {
        self.lib_dir().join(format!("{}.dep", self.module))
    }

    /// Candidate library files in lookup order.
    pub fn library_files(&self) -> Vec<PathBuf> {
        let lib_dir = self.lib_dir();
        self.platform
            .os
            .library_file_names(&self.module)
            .into_iter()
            .map(|name| lib_dir.join(name))
            .collect()
    }

    /// The first library file that exists, if any.
    pub fn library_file(&self) -> Option<PathBuf> {
        self.library_files().into_iter().find(|p| p.is_file())
    }

    pub fn dbd_file(&self) -> PathBuf {
        self.base_dir()
            .join("dbd")
            .join(format!("{}.dbd", self.module))
    }

    pub fn db_dir(&self) -> PathBuf {
        self.dir.join("db")
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.base_dir().join("bin").join(&self.platform.target_arch)
    }

    pub fn startup_dir(&self) -> PathBuf {
        self.dir.join("startup")
    }

    pub fn misc_dir(&self) -> PathBuf {
        self.dir.join("misc")
    }

    /// Whether this version was built and installed for the platform.
    pub fn is_installed(&self) -> bool {
        self.dep_file().is_file()
    }

    /// Every (base version, architecture) pair this module version carries a
    /// dependency manifest for, sorted.
    pub fn installed_platforms(&self) -> Result<Vec<InstalledPlatform>> {
        let mut found = Vec::new();
        for base in list_dirs(&self.dir)? {
            let lib = self.dir.join(&base).join("lib");
            if !lib.is_dir() {
                continue;
            }
            for arch in list_dirs(&lib)? {
                if lib.join(&arch).join(format!("{}.dep", self.module)).is_file() {
                    found.push(InstalledPlatform {
                        base_version: base.clone(),
                        target_arch: arch,
                    });
                }
            }
        }
        found.sort();
        Ok(found)
    }
}

/// Names of the subdirectories of `dir`; empty if `dir` does not exist.
fn list_dirs(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let io_err = |source| TargetError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if entry.path().is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linux() -> Platform {
        Platform::compose("3.15.4", "linux-x86_64").unwrap()
    }

    #[test]
    fn paths_follow_layout() {
        let layout = linux().layout("/repo/asyn/4.2.0", "asyn");
        assert_eq!(
            layout.dep_file(),
            PathBuf::from("/repo/asyn/4.2.0/3.15.4/lib/linux-x86_64/asyn.dep")
        );
        assert_eq!(
            layout.library_files(),
            vec![PathBuf::from("/repo/asyn/4.2.0/3.15.4/lib/linux-x86_64/libasyn.so")]
        );
        assert_eq!(
            layout.dbd_file(),
            PathBuf::from("/repo/asyn/4.2.0/3.15.4/dbd/asyn.dbd")
        );
        assert_eq!(
            layout.bin_dir(),
            PathBuf::from("/repo/asyn/4.2.0/3.15.4/bin/linux-x86_64")
        );
        assert_eq!(layout.db_dir(), PathBuf::from("/repo/asyn/4.2.0/db"));
        assert_eq!(layout.startup_dir(), PathBuf::from("/repo/asyn/4.2.0/startup"));
        assert_eq!(layout.misc_dir(), PathBuf::from("/repo/asyn/4.2.0/misc"));
    }

    #[test]
    fn installed_only_with_dep_file() {
        let dir = tempfile::tempdir().unwrap();
        let layout = linux().layout(dir.path(), "calc");
        assert!(!layout.is_installed());

        std::fs::create_dir_all(layout.lib_dir()).unwrap();
        assert!(!layout.is_installed());

        std::fs::write(layout.dep_file(), "").unwrap();
        assert!(layout.is_installed());
        assert!(layout.library_file().is_none());

        std::fs::write(&layout.library_files()[0], b"\x7fELF").unwrap();
        assert_eq!(layout.library_file(), Some(layout.library_files()[0].clone()));
    }

    #[test]
    fn lists_installed_platforms() {
        let dir = tempfile::tempdir().unwrap();
        for (base, arch) in [("3.15.4", "linux-x86_64"), ("3.15.4", "linux-arm"), ("7.0.7", "linux-x86_64")] {
            let lib = dir.path().join(base).join("lib").join(arch);
            std::fs::create_dir_all(&lib).unwrap();
            std::fs::write(lib.join("motor.dep"), "").unwrap();
        }
        // A build directory without a manifest does not count.
        std::fs::create_dir_all(dir.path().join("7.0.7/lib/windows-x64")).unwrap();

        let layout = linux().layout(dir.path(), "motor");
        let platforms = layout.installed_platforms().unwrap();
        assert_eq!(platforms.len(), 3);
        assert_eq!(platforms[0].base_version, "3.15.4");
        assert_eq!(platforms[0].target_arch, "linux-arm");
        assert_eq!(platforms[2].base_version, "7.0.7");
    }

    #[test]
    fn missing_dir_has_no_platforms() {
        let layout = linux().layout("/definitely/not/here", "motor");
        assert!(layout.installed_platforms().unwrap().is_empty());
    }
}
