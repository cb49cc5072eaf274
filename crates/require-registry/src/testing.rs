//! On-disk repository fixtures for unit tests.

use std::path::{Path, PathBuf};

use require_targets::Platform;
use tempfile::TempDir;

use crate::config::{RepositorySettings, RequireConfig};
use crate::repository::Repository;

pub const BASE: &str = "3.15.4";
pub const ARCH: &str = "linux-x86_64";

/// A temporary tree holding a module repository, a base installation, a
/// local modules directory and a system library directory.
pub struct RepoFixture {
    dir: TempDir,
}

impl RepoFixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("modules")).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn modules(&self) -> PathBuf {
        self.root().join("modules")
    }

    pub fn local(&self) -> PathBuf {
        self.root().join("local")
    }

    pub fn base(&self) -> PathBuf {
        self.root().join(format!("base-{BASE}"))
    }

    pub fn syslib(&self) -> PathBuf {
        self.root().join("syslib")
    }

    fn platform(base: &str, arch: &str) -> Platform {
        Platform::compose(base, arch).unwrap()
    }

    /// Install `module` at `version` for the fixture platform with the given
    /// dependency manifest text and a library file.
    pub fn install(&self, module: &str, version: &str, deps: &str) -> PathBuf {
        let dir = self.modules().join(module).join(version);
        write_build(&dir, module, &Self::platform(BASE, ARCH), deps, true);
        dir
    }

    pub fn install_without_library(&self, module: &str, version: &str, deps: &str) -> PathBuf {
        let dir = self.modules().join(module).join(version);
        write_build(&dir, module, &Self::platform(BASE, ARCH), deps, false);
        dir
    }

    /// Install for a different platform than the fixture's.
    pub fn install_for(&self, module: &str, version: &str, base: &str, arch: &str) -> PathBuf {
        let dir = self.modules().join(module).join(version);
        write_build(&dir, module, &Self::platform(base, arch), "", true);
        dir
    }

    /// A local build of `module` under `<local>/<app>/builddir`.
    pub fn install_local(&self, app: &str, module: &str, deps: &str) -> PathBuf {
        let dir = self.local().join(app).join("builddir");
        write_build(&dir, module, &Self::platform(BASE, ARCH), deps, true);
        dir
    }

    /// Write a definitions file for an installed version.
    pub fn dbd(&self, module: &str, version: &str, text: &str) {
        let layout = Self::platform(BASE, ARCH).layout(self.modules().join(module).join(version), module);
        let path = layout.dbd_file();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, text).unwrap();
    }

    /// Write a default-version hint file into the base installation.
    pub fn hint(&self, file: &str, text: &str) {
        let configure = self.base().join("configure");
        std::fs::create_dir_all(&configure).unwrap();
        std::fs::write(configure.join(file), text).unwrap();
    }

    /// Put a system library for `module` on the system search path.
    pub fn system_lib(&self, module: &str) -> PathBuf {
        std::fs::create_dir_all(self.syslib()).unwrap();
        let path = self.syslib().join(format!("lib{module}.so"));
        std::fs::write(&path, b"\x7fELF").unwrap();
        path
    }

    pub fn settings(&self) -> RepositorySettings {
        RepositorySettings {
            modules_path: Some(self.modules()),
            base_path: Some(self.base()),
            base_version: Some(BASE.to_string()),
            target_arch: Some(ARCH.to_string()),
            module_include_path: Some(self.syslib().to_string_lossy().into_owned()),
            local_modules_dir: Some(self.local()),
            build_dir: None,
        }
    }

    pub fn config(&self) -> RequireConfig {
        self.settings().resolve().unwrap()
    }

    pub fn repository(&self) -> Repository {
        Repository::new(&self.config())
    }
}

fn write_build(dir: &Path, module: &str, platform: &Platform, deps: &str, library: bool) {
    let layout = platform.layout(dir, module);
    std::fs::create_dir_all(layout.lib_dir()).unwrap();
    std::fs::write(layout.dep_file(), deps).unwrap();
    if library {
        std::fs::write(&layout.library_files()[0], b"\x7fELF").unwrap();
    }
}
