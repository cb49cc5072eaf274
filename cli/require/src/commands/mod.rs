//! CLI command implementations.

pub mod doctor;
pub mod require;
pub mod script;
pub mod show;
pub mod versions;

use anyhow::{Context, Result};
use require_registry::{RequireConfig, Session};

/// A session with `preloads` already recorded.
pub fn open_session(config: &RequireConfig, preloads: &[(String, String)]) -> Result<Session> {
    let mut session = Session::new(config);
    for (name, version) in preloads {
        session
            .preload(name, version)
            .with_context(|| format!("preloading {name} {version}"))?;
    }
    Ok(session)
}
