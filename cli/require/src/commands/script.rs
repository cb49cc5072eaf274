//! `require run <script>`: execute a startup script.
//!
//! Script commands, one per line (arguments split on whitespace or commas):
//! - `require <module> [version]`
//! - `show [pattern]`
//! - `snippet <file>`: run a file found along the startup include path
//! - `ready`: startup is complete; later failures are reported, not fatal

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use require_registry::{format_loaded, HostPhase, RequireConfig, Session};
use tracing::{error, info};

use super::open_session;

/// Outcome of a script that ran to the end.
#[derive(Debug, Default)]
pub struct ScriptReport {
    pub commands: usize,
    /// Commands that failed after `ready`.
    pub failures: usize,
}

pub fn run(config: &RequireConfig, preloads: &[(String, String)], script: &Path, export: bool) -> Result<()> {
    let mut session = open_session(config, preloads)?;
    let report = execute(&mut session, script)?;

    if session.phase() == HostPhase::Startup {
        info!("script ended without 'ready'");
    }
    if export {
        print!("{}", session.publication().to_shell_exports());
    }
    if report.failures > 0 {
        bail!(
            "{} of {} commands failed after ready",
            report.failures,
            report.commands
        );
    }
    Ok(())
}

/// Run `script` against `session`.
pub fn execute(session: &mut Session, script: &Path) -> Result<ScriptReport> {
    let mut runner = Runner {
        session,
        stack: Vec::new(),
        report: ScriptReport::default(),
    };
    runner.run_file(script)?;
    Ok(runner.report)
}

struct Runner<'a> {
    session: &'a mut Session,
    /// Files currently executing, outermost first.
    stack: Vec<PathBuf>,
    report: ScriptReport,
}

impl Runner<'_> {
    fn run_file(&mut self, path: &Path) -> Result<()> {
        if self.stack.iter().any(|p| p == path) {
            bail!("{} is already running", path.display());
        }
        let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

        self.stack.push(path.to_path_buf());
        let result = self.run_lines(path, &text);
        self.stack.pop();
        result
    }

    fn run_lines(&mut self, path: &Path, text: &str) -> Result<()> {
        for (i, line) in text.lines().enumerate() {
            let outcome = self
                .run_line(line)
                .with_context(|| format!("{}:{}", path.display(), i + 1));
            match outcome {
                Err(e) if self.session.phase() == HostPhase::Running => {
                    self.report.failures += 1;
                    error!("{e:#}");
                }
                other => other?,
            }
        }
        Ok(())
    }

    fn run_line(&mut self, line: &str) -> Result<()> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }
        let mut words = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|w| !w.is_empty());
        let Some(command) = words.next() else {
            return Ok(());
        };
        let args: Vec<&str> = words.collect();
        self.report.commands += 1;

        match (command, args.as_slice()) {
            ("require", [module]) => self.require(module, ""),
            ("require", [module, version]) => self.require(module, version),
            ("require", _) => bail!("usage: require <module> [version]"),
            ("show", [] | [_]) => {
                let modules = self.session.show(args.first().copied());
                print!("{}", format_loaded(modules));
                Ok(())
            }
            ("snippet", [file]) => {
                let path = self
                    .session
                    .find_snippet(file)
                    .with_context(|| format!("snippet {file} not found on the startup include path"))?;
                info!(snippet = %path.display(), "running snippet");
                self.run_file(&path)
            }
            ("ready", []) => {
                self.session.mark_ready();
                info!("startup complete");
                Ok(())
            }
            ("show" | "snippet" | "ready", _) => bail!("wrong number of arguments to {command}"),
            (other, _) => bail!("unknown command '{other}'"),
        }
    }

    fn require(&mut self, module: &str, version: &str) -> Result<()> {
        let resolved = self
            .session
            .require(module, version)
            .with_context(|| format!("require {module} {version}"))?;
        if !resolved.already_loaded {
            info!(module, version = %resolved.version, "loaded");
        }
        Ok(())
    }
}
