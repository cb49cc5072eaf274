//! Configuration discovery for the CLI.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use require_registry::config::CONFIG_FILE;
use require_registry::{RepositorySettings, RequireConfig};

use crate::RepoArgs;

/// Find `require.toml` in `start_dir` or the nearest ancestor.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let mut dir = start_dir.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// The configuration file to use: `--config` if given, else the nearest one.
pub fn config_file(cwd: &Path, args: &RepoArgs) -> Result<Option<PathBuf>> {
    match &args.config {
        Some(path) if !path.is_file() => bail!("config file {} not found", path.display()),
        Some(path) => Ok(Some(path.clone())),
        None => Ok(find_config(cwd)),
    }
}

/// Command-line flags as the highest-priority settings layer.
pub fn overrides(args: &RepoArgs) -> RepositorySettings {
    RepositorySettings {
        modules_path: args.modules_path.clone(),
        base_path: args.base_path.clone(),
        base_version: args.base_version.clone(),
        target_arch: args.target_arch.clone(),
        module_include_path: args.module_include_path.clone(),
        local_modules_dir: args.local_modules_dir.clone(),
        build_dir: args.build_dir.clone(),
    }
}

/// Load the full configuration: file, then environment, then flags.
pub fn load(cwd: &Path, args: &RepoArgs) -> Result<RequireConfig> {
    let file = config_file(cwd, args)?;
    if let Some(path) = &file {
        tracing::debug!(path = %path.display(), "using configuration file");
    }
    RequireConfig::load(file.as_deref(), overrides(args)).context("loading configuration")
}

/// Split `NAME=VERSION` preload arguments.
pub fn parse_preloads(raw: &[String]) -> Result<Vec<(String, String)>> {
    raw.iter()
        .map(|arg| match arg.split_once('=') {
            Some((name, version)) if !name.is_empty() && !version.is_empty() => {
                Ok((name.to_string(), version.to_string()))
            }
            _ => bail!("invalid --preload '{arg}' (expected NAME=VERSION)"),
        })
        .collect()
}

/// Split `NAME` or `NAME=VERSION`.
pub fn split_request(arg: &str) -> (&str, &str) {
    arg.split_once('=').unwrap_or((arg, ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_config_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[repository]\n").unwrap();
        let nested = dir.path().join("ioc").join("boot");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config(&nested), Some(dir.path().join(CONFIG_FILE)));
    }

    #[test]
    fn explicit_config_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let args = RepoArgs {
            config: Some(dir.path().join("missing.toml")),
            ..Default::default()
        };
        assert!(config_file(dir.path(), &args).is_err());
    }

    #[test]
    fn flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[repository]\nmodules-path = \"/from-file\"\nbase-version = \"3.15.4\"\ntarget-arch = \"linux-x86_64\"\n",
        )
        .unwrap();
        let args = RepoArgs {
            modules_path: Some(PathBuf::from("/from-flag")),
            base_version: Some("3.15.4".into()),
            target_arch: Some("linux-x86_64".into()),
            ..Default::default()
        };
        let config = load(dir.path(), &args).unwrap();
        assert_eq!(config.modules_path, PathBuf::from("/from-flag"));
    }

    #[test]
    fn request_splitting() {
        assert_eq!(split_request("asyn=4.2+"), ("asyn", "4.2+"));
        assert_eq!(split_request("asyn"), ("asyn", ""));
    }
}
