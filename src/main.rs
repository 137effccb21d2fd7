mod adapters;
mod cli;
mod config;
mod core;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::context::RunContext;
use cli::{Cli, Commands};

fn main() {
    let args = Cli::parse();

    init_tracing(&args);

    let result = RunContext::load(
        args.config.as_deref(),
        args.storage.clone(),
        args.verbose,
        args.quiet,
    )
    .and_then(|ctx| match &args.command {
        Commands::Sync { webkey_service_url } => {
            cli::commands::sync::execute(webkey_service_url.as_deref(), &ctx)
        }
        Commands::Serve { bind } => cli::commands::serve::execute(bind.as_deref(), &ctx),
    });

    if let Err(e) = result {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}

/// Log to stderr. `RUST_LOG` wins; otherwise the server logs requests at
/// info and the CLI stays at warn unless `--verbose` is given.
fn init_tracing(args: &Cli) {
    let default = match (&args.command, args.verbose, args.quiet) {
        (_, _, true) => "error",
        (_, true, _) => "debug",
        (Commands::Serve { .. }, _, _) => "info",
        (Commands::Sync { .. }, _, _) => "warn",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
