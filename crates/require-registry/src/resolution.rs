//! Recursive dependency resolution.
//!
//! A [`Session`] owns everything one host process accumulates while loading
//! modules: the loaded-module record, the publication map and the loader
//! collaborator. `require` walks a module's dependency manifest depth-first in
//! file order and loads each module only after all of its dependencies are
//! active.

use std::path::PathBuf;

use require_targets::{OsFamily, Platform};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::RequireConfig;
use crate::error::{RequireError, Result};
use crate::loaded::{LoadedModule, LoadedModules};
use crate::loader::{LoadError, Loader, RecordingLoader};
use crate::manifest::DependencyManifest;
use crate::name;
use crate::publish::{self, Publication};
use crate::repository::{Candidate, Origin, Repository};
use crate::version::{self, VersionSpec};

/// Whether the host is still running its startup sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostPhase {
    /// Failures abort the startup sequence.
    Startup,
    /// Failures are reported only.
    Running,
}

/// What one `require` call resolved.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedModule {
    pub name: String,
    pub version: String,
    pub path: Option<PathBuf>,
    /// `None` when the module was already active.
    pub origin: Option<Origin>,
    pub already_loaded: bool,
    pub dependencies: Vec<ResolvedModule>,
}

/// One host's module loading state.
pub struct Session<L: Loader = RecordingLoader> {
    repository: Repository,
    loaded: LoadedModules,
    publication: Publication,
    loader: L,
    phase: HostPhase,
    /// Modules currently being resolved, outermost first.
    chain: Vec<String>,
}

impl Session<RecordingLoader> {
    pub fn new(config: &RequireConfig) -> Self {
        Self::with_loader(config, RecordingLoader::new())
    }
}

impl<L: Loader> Session<L> {
    /// A session in its startup phase using `loader`.
    pub fn with_loader(config: &RequireConfig, loader: L) -> Self {
        Self {
            repository: Repository::new(config),
            loaded: LoadedModules::new(),
            publication: Publication::new(),
            loader,
            phase: HostPhase::Startup,
            chain: Vec::new(),
        }
    }

    /// Make `module` available, loading it and its dependencies if needed.
    ///
    /// `version` is a constraint (`2.3`, `2.3+`), a named version, `local`,
    /// or empty for any. During the startup phase a failure comes back as
    /// [`RequireError::StartupAborted`].
    pub fn require(&mut self, module: &str, version: &str) -> Result<ResolvedModule> {
        let result = self.resolve(module, version.trim());
        self.chain.clear();
        match result {
            Err(err) if self.phase == HostPhase::Startup => Err(RequireError::StartupAborted {
                module: module.to_string(),
                source: Box::new(err),
            }),
            other => other,
        }
    }

    /// The loaded version of `module`, if active.
    pub fn loaded_version(&self, module: &str) -> Option<&str> {
        self.loaded.lookup(module)
    }

    /// Record modules linked into the host binary before any resolution.
    pub fn preload(&mut self, module: &str, version: &str) -> Result<()> {
        name::check(module).map_err(|detail| RequireError::Validation { detail })?;
        VersionSpec::parse(version)?;
        match self.loaded.lookup(module) {
            Some(loaded) if loaded == version => Ok(()),
            Some(loaded) => Err(RequireError::Conflict {
                module: module.to_string(),
                loaded: loaded.to_string(),
                requested: version.to_string(),
            }),
            None => {
                debug!(module, version, "preloaded");
                self.loaded.register(module, version);
                self.publication.set(Publication::version_key(module), version);
                Ok(())
            }
        }
    }

    /// End the startup phase; later failures no longer abort.
    pub fn mark_ready(&mut self) {
        self.phase = HostPhase::Running;
    }

    pub fn phase(&self) -> HostPhase {
        self.phase
    }

    pub fn loaded(&self) -> &LoadedModules {
        &self.loaded
    }

    /// Loaded modules whose name contains `pattern`, newest first.
    pub fn show(&self, pattern: Option<&str>) -> Vec<&LoadedModule> {
        self.loaded.show(pattern)
    }

    pub fn publication(&self) -> &Publication {
        &self.publication
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Locate a startup snippet in the startup directories of loaded modules.
    pub fn find_snippet(&self, file: &str) -> Option<PathBuf> {
        self.publication
            .search_path(publish::STARTUP_INCLUDE_PATH, self.os())?
            .find(file)
    }

    fn os(&self) -> OsFamily {
        self.repository.platform().os
    }

    fn resolve(&mut self, module: &str, requested: &str) -> Result<ResolvedModule> {
        name::check(module).map_err(|detail| RequireError::Validation { detail })?;
        let spec = VersionSpec::parse(requested)?;

        if let Some(loaded) = self.loaded.lookup(module) {
            return self.check_loaded(module, loaded, requested, &spec);
        }

        if self.chain.iter().any(|m| m == module) {
            let mut chain = self.chain.clone();
            chain.push(module.to_string());
            return Err(RequireError::CyclicDependency { chain });
        }

        let candidate = match self.repository.find_candidate(module, requested)? {
            Some(found) => found,
            None => self
                .repository
                .find_system_library(module)
                .ok_or_else(|| RequireError::NotFound {
                    module: module.to_string(),
                    requested: requested.to_string(),
                })?,
        };
        info!(
            module,
            version = %candidate.version,
            path = %candidate.path.display(),
            "module found"
        );

        self.chain.push(module.to_string());
        let dependencies = self.resolve_dependencies(module, &candidate);
        self.chain.pop();
        let dependencies = dependencies?;

        self.load(module, &candidate)?;
        self.register(module, &candidate);

        Ok(ResolvedModule {
            name: module.to_string(),
            version: candidate.version,
            path: Some(candidate.path),
            origin: Some(candidate.origin),
            already_loaded: false,
            dependencies,
        })
    }

    fn check_loaded(
        &self,
        module: &str,
        loaded: &str,
        requested: &str,
        spec: &VersionSpec,
    ) -> Result<ResolvedModule> {
        let release = version::is_release(loaded)
            .then(|| VersionSpec::parse(loaded).ok())
            .flatten();
        let compatible = if requested.is_empty() || requested == loaded {
            true
        } else if let Some(release) = release {
            spec.matches(&release.floor())
        } else {
            warn!(
                module,
                loaded, requested, "loaded version is not a release, assuming it is compatible"
            );
            true
        };

        if !compatible {
            return Err(RequireError::Conflict {
                module: module.to_string(),
                loaded: loaded.to_string(),
                requested: requested.to_string(),
            });
        }
        debug!(module, loaded, "already loaded");
        Ok(ResolvedModule {
            name: module.to_string(),
            version: loaded.to_string(),
            path: self
                .publication
                .get(&Publication::path_key(module))
                .map(PathBuf::from),
            origin: None,
            already_loaded: true,
            dependencies: Vec::new(),
        })
    }

    fn resolve_dependencies(&mut self, module: &str, candidate: &Candidate) -> Result<Vec<ResolvedModule>> {
        if candidate.origin == Origin::System {
            return Ok(Vec::new());
        }
        let dep_file = self.repository.layout(&candidate.path, module).dep_file();
        let manifest = DependencyManifest::load(&dep_file)?;
        let mut resolved = Vec::with_capacity(manifest.entries.len());
        for entry in &manifest.entries {
            info!(module, dependency = %entry.name, version = %entry.version, "dependency");
            resolved.push(self.resolve(&entry.name, &entry.version)?);
        }
        Ok(resolved)
    }

    fn load(&mut self, module: &str, candidate: &Candidate) -> Result<()> {
        let failure = |path: &std::path::Path, err: LoadError| RequireError::LoadFailure {
            module: module.to_string(),
            path: path.to_path_buf(),
            detail: err.detail,
        };

        if let Some(library) = &candidate.library {
            info!(module, library = %library.display(), "loading library");
            self.loader
                .load_library(library)
                .map_err(|e| failure(library, e))?;
        }
        if candidate.origin == Origin::System {
            return Ok(());
        }

        let dbd = self.repository.layout(&candidate.path, module).dbd_file();
        let has_definitions = std::fs::metadata(&dbd).map(|m| m.len() > 0).unwrap_or(false);
        if has_definitions {
            info!(module, dbd = %dbd.display(), "loading definitions");
            self.loader
                .load_definitions(&dbd)
                .map_err(|e| failure(&dbd, e))?;
            let symbol = Platform::init_symbol(module);
            self.loader
                .call_init(&symbol)
                .map_err(|e| failure(&dbd, e))?;
        }
        Ok(())
    }

    fn register(&mut self, module: &str, candidate: &Candidate) {
        self.loaded.register(module, &candidate.version);
        self.publication
            .module(module, &candidate.version, &candidate.path);
        if candidate.origin != Origin::System {
            let layout = self.repository.layout(&candidate.path, module);
            self.publication.include_dirs(&layout);
        }
    }
}
