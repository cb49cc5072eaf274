//! require CLI: resolve, load and inspect versioned modules.

mod commands;
mod config;
mod logging;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use require_registry::RequireConfig;

#[derive(Parser)]
#[command(name = "require", version, about = "Versioned module loader")]
struct Cli {
    #[command(flatten)]
    repo: RepoArgs,
    /// Log every discovery step
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

/// Repository settings; each flag overrides the environment and require.toml.
#[derive(Args, Debug, Default)]
pub struct RepoArgs {
    /// Configuration file (default: nearest require.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Root of the module repository
    #[arg(long, global = true)]
    modules_path: Option<PathBuf>,
    /// Base installation holding configure/default.dep
    #[arg(long, global = true)]
    base_path: Option<PathBuf>,
    /// Base version builds are nested under (e.g. 3.15.4)
    #[arg(long, global = true)]
    base_version: Option<String>,
    /// Target architecture (e.g. linux-x86_64)
    #[arg(long, global = true)]
    target_arch: Option<String>,
    /// Search path for system libraries
    #[arg(long, global = true)]
    module_include_path: Option<String>,
    /// Directory scanned for local builds
    #[arg(long, global = true)]
    local_modules_dir: Option<PathBuf>,
    /// Build directory inside each local module
    #[arg(long, global = true)]
    build_dir: Option<String>,
    /// Module linked into the host, as NAME=VERSION
    #[arg(long = "preload", value_name = "NAME=VERSION", global = true)]
    preloads: Vec<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    #[default]
    Human,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a module and its dependencies
    Require {
        /// Module name
        module: String,
        /// Version constraint (e.g. 2.3, 2.3+, test, local)
        version: Option<String>,
        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: Format,
        /// Print published settings as shell export lines
        #[arg(long)]
        export: bool,
    },
    /// List loaded modules
    Show {
        /// Only modules whose name contains this text
        pattern: Option<String>,
        /// Resolve these modules first, as NAME or NAME=VERSION
        #[arg(long = "require", value_name = "NAME[=VERSION]")]
        requires: Vec<String>,
        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: Format,
    },
    /// List installed versions of a module
    Versions {
        /// Module name
        module: String,
        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: Format,
    },
    /// Execute a startup script
    Run {
        /// Script file (require, show, snippet and ready commands)
        script: PathBuf,
        /// Print published settings as shell export lines when done
        #[arg(long)]
        export: bool,
    },
    /// Show configuration and repository diagnostics
    Doctor,
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Require {
            module,
            version,
            format,
            export,
        } => {
            let (config, preloads) = load_inputs(&cwd, &cli.repo)?;
            commands::require::run(
                &config,
                &preloads,
                &module,
                version.as_deref().unwrap_or(""),
                format,
                export,
            )
        }

        Commands::Show {
            pattern,
            requires,
            format,
        } => {
            let (config, preloads) = load_inputs(&cwd, &cli.repo)?;
            commands::show::run(&config, &preloads, &requires, pattern.as_deref(), format)
        }

        Commands::Versions { module, format } => {
            let (config, _) = load_inputs(&cwd, &cli.repo)?;
            commands::versions::run(&config, &module, format)
        }

        Commands::Run { script, export } => {
            let (config, preloads) = load_inputs(&cwd, &cli.repo)?;
            commands::script::run(&config, &preloads, &script, export)
        }

        Commands::Doctor => commands::doctor::run(&cwd, &cli.repo),
    }
}

/// Resolved configuration plus the `--preload` pairs.
fn load_inputs(cwd: &Path, repo: &RepoArgs) -> anyhow::Result<(RequireConfig, Vec<(String, String)>)> {
    let config = config::load(cwd, repo)?;
    let preloads = config::parse_preloads(&repo.preloads)?;
    Ok((config, preloads))
}
