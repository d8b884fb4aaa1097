//! chartpin - pick the newest Helm chart version that satisfies a constraint

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod exit_codes;

use error::{CliError, Result};

#[derive(Parser)]
#[command(name = "chartpin")]
#[command(author = "chartpin Contributors")]
#[command(version)]
#[command(about = "Pick the newest Helm chart version that satisfies a semver constraint", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the newest chart version satisfying a constraint
    Select {
        /// Repository URL (http://, https:// or oci://)
        repo_url: String,

        /// Chart name (required for HTTP repositories, ignored for OCI)
        #[arg(short, long, default_value = "")]
        chart: String,

        /// Semver constraint, e.g. "^1.2.0" or ">=1.0, <2.0" (empty: newest)
        #[arg(short = 'C', long, default_value = "")]
        constraint: String,

        /// Username for the repository or registry
        #[arg(short, long)]
        username: Option<String>,

        /// Environment variable holding the password
        #[arg(long, default_value = "CHARTPIN_PASSWORD")]
        password_env: String,

        /// Settings file (default: <config dir>/chartpin/config.yaml)
        #[arg(long, env = "CHARTPIN_CONFIG")]
        config: Option<PathBuf>,

        /// Fetch deadline in seconds (0 disables it)
        #[arg(long)]
        timeout: Option<u64>,

        /// Ignore published versions that are not semantic versions
        #[arg(long)]
        skip_invalid: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Refresh a chart's dependencies with helm under a dedicated HOME
    DependencyUpdate {
        /// Chart directory
        chart_path: PathBuf,

        /// Directory used as HOME for helm
        #[arg(long)]
        home: PathBuf,

        /// helm executable
        #[arg(long, default_value = "helm")]
        helm: String,
    },
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::try_parse().unwrap_or_else(|e| {
        let code = if e.use_stderr() {
            exit_codes::USAGE_ERROR
        } else {
            exit_codes::SUCCESS
        };
        let _ = e.print();
        std::process::exit(code);
    });

    init_logging(cli.debug);

    if let Err(err) = run(cli) {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Log to stderr; `RUST_LOG` overrides the level chosen by `--debug`
fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(debug)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::internal(format!("failed to start runtime: {}", e)))?;

    match cli.command {
        Commands::Select {
            repo_url,
            chart,
            constraint,
            username,
            password_env,
            config,
            timeout,
            skip_invalid,
            json,
        } => runtime.block_on(commands::select::run(commands::select::SelectArgs {
            repo_url: &repo_url,
            chart: &chart,
            constraint: &constraint,
            username: username.as_deref(),
            password_env: &password_env,
            config: config.as_deref(),
            timeout,
            skip_invalid,
            json,
        })),

        Commands::DependencyUpdate {
            chart_path,
            home,
            helm,
        } => runtime.block_on(commands::dep::update(&chart_path, &home, &helm)),
    }
}
