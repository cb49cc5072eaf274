//! `require show [pattern]`: list loaded modules.

use anyhow::{Context, Result};
use require_registry::{format_loaded, RequireConfig};

use super::open_session;
use crate::config::split_request;
use crate::Format;

pub fn run(
    config: &RequireConfig,
    preloads: &[(String, String)],
    requires: &[String],
    pattern: Option<&str>,
    format: Format,
) -> Result<()> {
    let mut session = open_session(config, preloads)?;
    session.mark_ready();
    for request in requires {
        let (module, version) = split_request(request);
        session
            .require(module, version)
            .with_context(|| format!("require {module} {version}"))?;
    }

    let modules = session.show(pattern);
    match format {
        Format::Human if modules.is_empty() => println!("No modules loaded."),
        Format::Human => print!("{}", format_loaded(modules)),
        Format::Json => println!("{}", serde_json::to_string_pretty(&modules)?),
    }
    Ok(())
}
