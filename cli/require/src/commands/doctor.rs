//! `require doctor`: configuration and repository diagnostics.

use std::path::Path;

use anyhow::Result;
use require_registry::config::{
    ENV_BASE, ENV_BASE_VERSION, ENV_HOST_ARCH, ENV_MODULES_PATH, ENV_MODULE_INCLUDE_PATH,
};
use require_registry::{DefaultVersions, RequireConfig};

use crate::config;
use crate::RepoArgs;

/// Print diagnostic information. Problems are reported, not returned.
pub fn run(cwd: &Path, args: &RepoArgs) -> Result<()> {
    println!("=== require doctor ===");
    println!();
    println!("require version: {}", env!("CARGO_PKG_VERSION"));
    println!("host arch:       {}", require_targets::platform::host_arch());
    println!();

    println!("--- Environment ---");
    for key in [
        ENV_MODULES_PATH,
        ENV_BASE,
        ENV_BASE_VERSION,
        ENV_HOST_ARCH,
        ENV_MODULE_INCLUDE_PATH,
    ] {
        match std::env::var(key) {
            Ok(value) => println!("  {key:<26} {value}"),
            Err(_) => println!("  {key:<26} (unset)"),
        }
    }
    println!();

    println!("--- Configuration ---");
    match config::config_file(cwd, args) {
        Ok(Some(path)) => println!("  config file: {}", path.display()),
        Ok(None) => println!("  config file: none"),
        Err(e) => println!("  config file: error: {e}"),
    }
    let config = match config::load(cwd, args) {
        Ok(config) => config,
        Err(e) => {
            println!("  error: {e:#}");
            return Ok(());
        }
    };
    print_config(&config);
    println!();

    println!("--- Repository ---");
    print_repository(&config);
    Ok(())
}

fn print_config(config: &RequireConfig) {
    println!("  platform:          {}", config.platform);
    println!("  modules path:      {}", config.modules_path.display());
    match &config.base_path {
        Some(base) => println!("  base path:         {}", base.display()),
        None => println!("  base path:         (none, default-version hints disabled)"),
    }
    println!("  system libraries:  {}", config.module_include_path);
    println!(
        "  local builds:      {}/*/{}",
        config.local_modules_dir.display(),
        config.build_dir
    );
}

fn print_repository(config: &RequireConfig) {
    let modules = match std::fs::read_dir(&config.modules_path) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .count(),
        Err(e) => {
            println!("  {}: {e}", config.modules_path.display());
            return;
        }
    };
    println!("  modules:           {modules}");

    let Some(base) = &config.base_path else {
        return;
    };
    let configure = base.join("configure");
    for file in [config.platform.arch_hint_file_name(), "default.dep".to_string()] {
        let path = configure.join(&file);
        match DefaultVersions::load(&path) {
            Ok(Some(table)) => {
                let problems = table.problems();
                if problems.is_empty() {
                    println!("  hint file:         {} (ok)", path.display());
                } else {
                    println!("  hint file:         {} ({} bad lines)", path.display(), problems.len());
                    for problem in problems {
                        println!("    {problem}");
                    }
                }
            }
            Ok(None) => println!("  hint file:         {} (absent)", path.display()),
            Err(e) => println!("  hint file:         {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doctor_reports_without_failing() {
        let dir = tempfile::tempdir().unwrap();
        let args = RepoArgs {
            modules_path: Some(dir.path().join("missing")),
            base_version: Some("7.0.7".into()),
            target_arch: Some("linux-x86_64".into()),
            ..Default::default()
        };
        run(dir.path(), &args).unwrap();

        // Incomplete configuration is reported, not returned.
        run(dir.path(), &RepoArgs::default()).unwrap();
    }
}
