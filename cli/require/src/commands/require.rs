//! `require require <module> [version]`: resolve one module.

use anyhow::{Context, Result};
use require_registry::{format_tree, RequireConfig};

use super::open_session;
use crate::Format;

/// Resolve `module` in the running phase and report what was loaded.
pub fn run(
    config: &RequireConfig,
    preloads: &[(String, String)],
    module: &str,
    version: &str,
    format: Format,
    export: bool,
) -> Result<()> {
    let mut session = open_session(config, preloads)?;
    session.mark_ready();

    let resolved = session
        .require(module, version)
        .with_context(|| format!("require {module} {version}"))?;

    if export {
        print!("{}", session.publication().to_shell_exports());
        return Ok(());
    }
    match format {
        Format::Human => print!("{}", format_tree(&resolved)),
        Format::Json => {
            let report = serde_json::json!({
                "resolved": resolved,
                "loaded": session.loaded().iter().collect::<Vec<_>>(),
                "published": session.publication(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
