//! `require versions <module>`: list installed versions.

use anyhow::{bail, Result};
use require_registry::{RequireConfig, Repository};

use crate::Format;

/// Print every version directory of `module`, marking the ones usable on the
/// configured platform.
pub fn run(config: &RequireConfig, module: &str, format: Format) -> Result<()> {
    let repository = Repository::new(config);
    let inventory = repository.inventory(module)?;
    if inventory.is_empty() {
        bail!(
            "no versions of {module} in {}",
            repository.modules_path().display()
        );
    }

    let platform = repository.platform();
    let usable = |platforms: &[require_targets::InstalledPlatform]| {
        platforms
            .iter()
            .any(|p| p.base_version == platform.base_version && p.target_arch == platform.target_arch)
    };

    match format {
        Format::Human => {
            println!("{module} ({})", repository.modules_path().join(module).display());
            for entry in &inventory {
                let marker = if usable(&entry.platforms) { "*" } else { " " };
                let builds: Vec<String> = entry
                    .platforms
                    .iter()
                    .map(|p| format!("{}/{}", p.base_version, p.target_arch))
                    .collect();
                println!("  {marker} {:<12} {}", entry.name, builds.join(" "));
            }
            println!();
            println!("* usable on {platform}");
        }
        Format::Json => {
            let entries: Vec<_> = inventory
                .iter()
                .map(|entry| {
                    serde_json::json!({
                        "version": entry.name,
                        "path": entry.dir,
                        "usable": usable(&entry.platforms),
                        "platforms": entry.platforms,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }
    Ok(())
}
