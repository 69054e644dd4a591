//! # kubeload CLI Entry Point
//!
//! Parses arguments, installs logging, and dispatches to handler modules.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// kubeload: build typed objects from Kubernetes-style YAML manifests.
///
/// Types come from a catalog of attribute maps and type signatures; the
/// bundled core catalog is used unless `--catalog` is given.
#[derive(Parser, Debug)]
#[command(name = "kubeload", version, about)]
struct Cli {
    /// Type catalog file or directory (repeatable).
    #[arg(long = "catalog", value_name = "PATH", global = true)]
    catalogs: Vec<PathBuf>,

    /// Loader configuration file (YAML).
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Build objects from a manifest file or directory.
    Load(kubeload_cli::load::LoadArgs),
    /// Show how an apiVersion/kind pair resolves to a type.
    Resolve(kubeload_cli::resolve::ResolveArgs),
    /// List the types in the catalog.
    Types(kubeload_cli::types::TypesArgs),
}

fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let registry = kubeload_cli::open_registry(&cli.catalogs)?;
    let mut stdout = std::io::stdout().lock();

    match &cli.command {
        Commands::Load(args) => {
            let config = kubeload_cli::read_config(cli.config.as_deref())?;
            kubeload_cli::load::run(args, &registry, config, &mut stdout)
        }
        Commands::Resolve(args) => kubeload_cli::resolve::run(args, &registry, &mut stdout),
        Commands::Types(args) => kubeload_cli::types::run(args, &registry, &mut stdout),
    }
}
