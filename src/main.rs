//! diecast - reconcile die-cast toy inventory against wiki catalog tables

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use diecast::cli::{Cli, Commands, ConfigCommands};
use diecast::config::Config;
use diecast::error::Result;

mod commands;
mod utils;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        if let Some(hint) = e.hint() {
            eprintln!("\n{}", hint);
        }
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "diecast=debug" } else { "diecast=warn" };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    // Completions and config location work even with a broken config file
    match cli.command {
        Commands::Completions { shell } => return commands::cmd_completions(shell),
        Commands::Config(ConfigCommands::Path) => return commands::cmd_config_path(cli.config),
        Commands::Config(ConfigCommands::Init { force }) => {
            return commands::cmd_config_init(cli.config, force)
        }
        _ => {}
    }

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Lookup { identifier, model, brand, json, rows } => {
            commands::cmd_lookup(&config, &identifier, &model, brand, json, rows)
        }
        Commands::Parse { file, identifier, json, rows } => {
            commands::cmd_parse(&config, &file, &identifier, json, rows)
        }
        Commands::Url { model, brand } => commands::cmd_url(&config, &model, brand),
        Commands::Reconcile { inventory, log, dry_run, limit, delay } => {
            commands::cmd_reconcile(&config, &inventory, &log, dry_run, limit, delay)
        }
        Commands::Config(ConfigCommands::Show) => commands::cmd_config_show(&config),
        Commands::Config(_) | Commands::Completions { .. } => Ok(()),
    }
}
