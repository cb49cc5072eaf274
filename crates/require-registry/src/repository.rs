//! Candidate discovery in a filesystem module repository.
//!
//! Repository layout:
//! ```text
//! <modules-path>/
//!   <module>/
//!     1.2.0/         : released version
//!     2.0.1/
//!     test/          : named (developer) build
//! ```
//! A version directory only counts when it carries a dependency manifest for
//! the session's platform (see [`ModuleLayout::is_installed`]).

use std::path::{Path, PathBuf};

use require_targets::{InstalledPlatform, ModuleLayout, Platform, SearchPath};
use serde::Serialize;
use tracing::debug;

use crate::config::RequireConfig;
use crate::error::{RequireError, Result};
use crate::manifest::DefaultVersions;
use crate::version::{self, Version, VersionSpec};

/// Version text recorded for local builds.
pub const LOCAL_VERSION: &str = "local";
/// Version text recorded for platform system libraries.
pub const SYSTEM_VERSION: &str = "system";

/// Where a candidate was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    /// A build in the local modules directory.
    Local,
    /// A named version directory in the repository.
    Named,
    /// A released version directory in the repository.
    Installed,
    /// A shared library on the system library search path.
    System,
}

/// A module installation chosen for loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Version directory, or the directory holding a system library.
    pub path: PathBuf,
    pub version: String,
    pub origin: Origin,
    /// The native library to load, if the installation ships one.
    pub library: Option<PathBuf>,
}

/// A released version directory usable on the session's platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledVersion {
    pub version: Version,
    pub dir: PathBuf,
}

/// A version directory together with every platform it is built for.
#[derive(Debug, Clone, Serialize)]
pub struct VersionInventory {
    pub name: String,
    pub dir: PathBuf,
    pub platforms: Vec<InstalledPlatform>,
}

/// Read-only view of the module repository for one platform.
#[derive(Debug, Clone)]
pub struct Repository {
    modules_path: PathBuf,
    base_path: Option<PathBuf>,
    platform: Platform,
    local_modules_dir: PathBuf,
    build_dir: String,
    system_path: SearchPath,
}

impl Repository {
    pub fn new(config: &RequireConfig) -> Self {
        Self {
            modules_path: config.modules_path.clone(),
            base_path: config.base_path.clone(),
            platform: config.platform.clone(),
            local_modules_dir: config.local_modules_dir.clone(),
            build_dir: config.build_dir.clone(),
            system_path: config.module_include_path.clone(),
        }
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn modules_path(&self) -> &Path {
        &self.modules_path
    }

    /// Installation layout of `module` at `dir`.
    pub fn layout(&self, dir: impl Into<PathBuf>, module: &str) -> ModuleLayout {
        self.platform.layout(dir, module)
    }

    /// Pick the installation of `module` that satisfies `requested`.
    ///
    /// Tried in order: a local build (no version or `local` requested), the
    /// default-version hint (no version requested), a named version
    /// directory, then the highest matching released version. Returns `None`
    /// when nothing qualifies.
    pub fn find_candidate(&self, module: &str, requested: &str) -> Result<Option<Candidate>> {
        if requested.is_empty() || requested == LOCAL_VERSION {
            if let Some(local) = self.find_local(module)? {
                return Ok(Some(local));
            }
        }

        let mut request = requested.to_string();
        if request.is_empty() {
            if let Some(hinted) = self.hinted_version(module)? {
                debug!(module, version = %hinted, "using default version");
                request = hinted;
            }
        }

        if !request.is_empty() && !version::is_numeric_expression(&request) {
            return Ok(self.find_named(module, &request));
        }

        let spec = VersionSpec::parse(&request)?;
        let installed = self.installed_versions(module)?;
        let chosen = installed.into_iter().rev().find(|v| spec.matches(&v.version));
        match chosen {
            Some(found) => {
                debug!(module, version = %found.version, "chosen");
                Ok(Some(self.candidate(module, found.dir, found.version.to_string(), Origin::Installed)))
            }
            None => {
                debug!(module, %spec, "no installed version matches");
                Ok(None)
            }
        }
    }

    /// The first `<local-modules-dir>/*/<build-dir>` that holds a build of
    /// `module` for this platform. Subdirectories are tried in name order.
    pub fn find_local(&self, module: &str) -> Result<Option<Candidate>> {
        if !self.local_modules_dir.is_dir() {
            return Ok(None);
        }
        debug!(dir = %self.local_modules_dir.display(), "looking for local builds");
        for name in list_dirs(&self.local_modules_dir)? {
            let dir = self.local_modules_dir.join(&name).join(&self.build_dir);
            if self.layout(&dir, module).is_installed() {
                debug!(module, dir = %dir.display(), "found local build");
                return Ok(Some(self.candidate(module, dir, LOCAL_VERSION.to_string(), Origin::Local)));
            }
        }
        Ok(None)
    }

    /// The named version directory `<modules-path>/<module>/<name>`, if it is
    /// built for this platform.
    pub fn find_named(&self, module: &str, name: &str) -> Option<Candidate> {
        if !version::is_directory_name(name) {
            debug!(module, version = name, "not a version directory name");
            return None;
        }
        let dir = self.modules_path.join(module).join(name);
        if self.layout(&dir, module).is_installed() {
            debug!(module, version = name, "found named version");
            Some(self.candidate(module, dir, name.to_string(), Origin::Named))
        } else {
            debug!(module, version = name, "named version not installed");
            None
        }
    }

    /// The default version hinted for `module` by the base installation,
    /// checking the architecture-specific table before the generic one.
    pub fn hinted_version(&self, module: &str) -> Result<Option<String>> {
        let Some(base) = &self.base_path else {
            return Ok(None);
        };
        let configure = base.join("configure");
        for file in [self.platform.arch_hint_file_name(), "default.dep".to_string()] {
            let path = configure.join(file);
            debug!(path = %path.display(), "reading default versions");
            if let Some(table) = DefaultVersions::load(&path)? {
                if let Some(hinted) = table.lookup(module)? {
                    return Ok(Some(hinted));
                }
            }
        }
        Ok(None)
    }

    /// Released versions of `module` built for this platform, ascending.
    pub fn installed_versions(&self, module: &str) -> Result<Vec<InstalledVersion>> {
        let module_dir = self.modules_path.join(module);
        let mut found = Vec::new();
        for name in list_dirs(&module_dir)? {
            let Some(version) = version::parse_installed(&name) else {
                continue;
            };
            let dir = module_dir.join(&name);
            if !self.layout(&dir, module).is_installed() {
                debug!(module, version = %name, "not available on this platform");
                continue;
            }
            found.push(InstalledVersion { version, dir });
        }
        found.sort_by(|a, b| a.version.cmp(&b.version));
        Ok(found)
    }

    /// Every version directory of `module` with the platforms each one is
    /// built for, released versions first in ascending order.
    pub fn inventory(&self, module: &str) -> Result<Vec<VersionInventory>> {
        let module_dir = self.modules_path.join(module);
        let mut entries = Vec::new();
        for name in list_dirs(&module_dir)? {
            let dir = module_dir.join(&name);
            let platforms = self.layout(&dir, module).installed_platforms()?;
            entries.push(VersionInventory { name, dir, platforms });
        }
        entries.sort_by(|a, b| {
            let key = |e: &VersionInventory| version::parse_installed(&e.name);
            match (key(a), key(b)) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.name.cmp(&b.name),
            }
        });
        Ok(entries)
    }

    /// Find `module` as a platform shared library on the system search path.
    pub fn find_system_library(&self, module: &str) -> Option<Candidate> {
        self.platform
            .os
            .library_file_names(module)
            .iter()
            .find_map(|file| self.system_path.find(file))
            .map(|library| {
                debug!(module, library = %library.display(), "found system library");
                Candidate {
                    path: library.parent().map(Path::to_path_buf).unwrap_or_default(),
                    version: SYSTEM_VERSION.to_string(),
                    origin: Origin::System,
                    library: Some(library),
                }
            })
    }

    fn candidate(&self, module: &str, dir: PathBuf, version: String, origin: Origin) -> Candidate {
        let library = self.layout(&dir, module).library_file();
        Candidate {
            path: dir,
            version,
            origin,
            library,
        }
    }
}

/// Names of the subdirectories of `dir`, sorted; empty if `dir` does not
/// exist.
fn list_dirs(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let io_err = |source| RequireError::Io {
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
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::RepoFixture;

    #[test]
    fn highest_matching_version_wins() {
        let repo = RepoFixture::new();
        for v in ["1.0.0", "1.2.0", "2.0.0", "2.1.3"] {
            repo.install("foo", v, "");
        }
        let repository = repo.repository();

        let pick = |req: &str| repository.find_candidate("foo", req).unwrap().map(|c| c.version);
        assert_eq!(pick("1+").as_deref(), Some("2.1.3"));
        assert_eq!(pick("1").as_deref(), Some("1.2.0"));
        assert_eq!(pick("2.0").as_deref(), Some("2.0.0"));
        assert_eq!(pick("").as_deref(), Some("2.1.3"));
        assert_eq!(pick("3+"), None);
        assert_eq!(pick("1.1"), None);
    }

    #[test]
    fn other_platform_builds_are_ignored() {
        let repo = RepoFixture::new();
        repo.install("foo", "1.0.0", "");
        repo.install_for("foo", "2.0.0", "7.0.7", "linux-x86_64");
        repo.install_for("foo", "3.0.0", "3.15.4", "linux-arm");
        std::fs::create_dir_all(repo.modules().join("foo/4.0.0")).unwrap();

        let repository = repo.repository();
        let versions: Vec<_> = repository
            .installed_versions("foo")
            .unwrap()
            .into_iter()
            .map(|v| v.version.to_string())
            .collect();
        assert_eq!(versions, vec!["1.0.0"]);

        let inventory = repository.inventory("foo").unwrap();
        let names: Vec<_> = inventory.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["1.0.0", "2.0.0", "3.0.0", "4.0.0"]);
        assert_eq!(inventory[1].platforms[0].base_version, "7.0.7");
        assert!(inventory[3].platforms.is_empty());
    }

    #[test]
    fn named_version_lookup() {
        let repo = RepoFixture::new();
        repo.install("foo", "1.0.0", "");
        repo.install("foo", "test", "");
        let repository = repo.repository();

        let named = repository.find_candidate("foo", "test").unwrap().unwrap();
        assert_eq!(named.origin, Origin::Named);
        assert_eq!(named.version, "test");
        assert_eq!(named.path, repo.modules().join("foo/test"));

        assert!(repository.find_candidate("foo", "jdoe").unwrap().is_none());
    }

    #[test]
    fn named_version_stays_inside_module_dir() {
        let repo = RepoFixture::new();
        repo.install("foo", "1.0.0", "");
        let repository = repo.repository();

        assert!(repository.find_named("foo", "1.0.0").is_some());
        assert!(repository.find_named("foo", "../foo/1.0.0").is_none());
        assert!(repository.find_named("foo", "..").is_none());
    }

    #[test]
    fn local_build_preferred_without_version() {
        let repo = RepoFixture::new();
        repo.install("foo", "1.0.0", "");
        repo.install_local("fooApp", "foo", "");
        let repository = repo.repository();

        let local = repository.find_candidate("foo", "").unwrap().unwrap();
        assert_eq!(local.origin, Origin::Local);
        assert_eq!(local.version, LOCAL_VERSION);
        assert_eq!(local.path, repo.local().join("fooApp/builddir"));

        let explicit = repository.find_candidate("foo", "local").unwrap().unwrap();
        assert_eq!(explicit.origin, Origin::Local);

        let pinned = repository.find_candidate("foo", "1.0.0").unwrap().unwrap();
        assert_eq!(pinned.origin, Origin::Installed);
    }

    #[test]
    fn hint_files_in_order() {
        let repo = RepoFixture::new();
        for v in ["1.0.0", "1.5.0", "2.0.0"] {
            repo.install("foo", v, "");
            repo.install("bar", v, "");
        }
        repo.install("baz", "1.0.0", "");
        repo.install("baz", "dev", "");
        repo.hint("default.linux-x86_64.dep", "foo 1.0.0\n");
        repo.hint("default.dep", "foo 1.5.0\nbar 1+\nbaz dev\n");
        let repository = repo.repository();

        let pick = |m: &str, req: &str| repository.find_candidate(m, req).unwrap().unwrap().version;
        assert_eq!(pick("foo", ""), "1.0.0");
        assert_eq!(pick("bar", ""), "2.0.0");
        assert_eq!(pick("baz", ""), "dev");
        // An explicit request bypasses the hints.
        assert_eq!(pick("foo", "1.5"), "1.5.0");
    }

    #[test]
    fn bad_hint_line_only_affects_its_module() {
        let repo = RepoFixture::new();
        repo.install("foo", "1.0.0", "");
        repo.install("asyn", "4.2.0", "");
        repo.hint("default.dep", "asyn\nmy-mod 1.0\nfoo 1.0.0\n");
        let repository = repo.repository();

        let foo = repository.find_candidate("foo", "").unwrap().unwrap();
        assert_eq!(foo.version, "1.0.0");

        let err = repository.find_candidate("asyn", "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Manifest);
        assert!(err.to_string().contains("default.dep:1"), "{err}");
    }

    #[test]
    fn system_library_on_search_path() {
        let repo = RepoFixture::new();
        let syslib = repo.system_lib("pcre");
        let repository = repo.repository();

        assert!(repository.find_candidate("pcre", "").unwrap().is_none());
        let system = repository.find_system_library("pcre").unwrap();
        assert_eq!(system.origin, Origin::System);
        assert_eq!(system.version, SYSTEM_VERSION);
        assert_eq!(system.library, Some(syslib.clone()));
        assert_eq!(Some(system.path.as_path()), syslib.parent());

        assert!(repository.find_system_library("nothere").is_none());
    }

    #[test]
    fn candidate_carries_library_when_present() {
        let repo = RepoFixture::new();
        repo.install("foo", "1.0.0", "");
        repo.install_without_library("bar", "1.0.0", "");
        let repository = repo.repository();

        let foo = repository.find_candidate("foo", "").unwrap().unwrap();
        assert_eq!(
            foo.library,
            Some(repo.modules().join("foo/1.0.0/3.15.4/lib/linux-x86_64/libfoo.so"))
        );
        let bar = repository.find_candidate("bar", "").unwrap().unwrap();
        assert_eq!(bar.library, None);
    }
}
