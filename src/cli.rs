use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Shell types for completion generation
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

#[derive(Parser)]
#[command(name = "diecast")]
#[command(author, version, about = "Reconcile die-cast toy inventory against wiki catalog tables", long_about = None)]
#[command(after_help = r#"Examples:
  diecast lookup GJT68 "Twin Mill"                      Catalog data for one toy
  diecast lookup FYC12 "Mustang" --brand Matchbox       Use the Matchbox wiki
  diecast parse page.html GJT68                         Reconcile a saved page
  diecast reconcile inventory.csv                       Fill in every row of a sheet
  diecast url "'67 Camaro (2019)"                       Show the page a model maps to

Quick Start:
  1. diecast config init
  2. diecast lookup <TOY#> "<MODEL NAME>"
  3. diecast reconcile inventory.csv --dry-run
"#)]
pub struct Cli {
    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the wiki page for a model and reconcile one toy number
    #[command(after_help = r#"Examples:
  diecast lookup GJT68 "Twin Mill"
  diecast lookup GJT68 "Twin Mill" --json
  diecast lookup GJT68 "Twin Mill" --rows      Also show the matched table rows
  diecast lookup FYC12 "Mustang" --brand Matchbox
"#)]
    Lookup {
        /// Toy or collector number to look for
        #[arg(value_name = "TOY#")]
        identifier: String,

        /// Model name as written in the inventory
        #[arg(value_name = "MODEL")]
        model: String,

        /// Brand (selects the wiki); defaults to the configured brand
        #[arg(long, short = 'b')]
        brand: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Show the matched rows before merging
        #[arg(long)]
        rows: bool,
    },

    /// Reconcile a toy number against an HTML file (no network)
    #[command(after_help = r#"Examples:
  diecast parse Twin_Mill.html GJT68
  curl -s https://hotwheels.fandom.com/wiki/Twin_Mill | diecast parse - GJT68 --json
"#)]
    Parse {
        /// HTML file, or - for stdin
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Toy or collector number to look for
        #[arg(value_name = "TOY#")]
        identifier: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Show the matched rows before merging
        #[arg(long)]
        rows: bool,
    },

    /// Print the wiki URL a model name resolves to
    Url {
        /// Model name
        #[arg(value_name = "MODEL")]
        model: String,

        /// Brand (selects the wiki)
        #[arg(long, short = 'b')]
        brand: Option<String>,
    },

    /// Look up every row of an inventory CSV and write catalog data back
    #[command(after_help = r#"Examples:
  diecast reconcile inventory.csv
  diecast reconcile inventory.csv --dry-run          Report only, leave the file alone
  diecast reconcile inventory.csv --limit 10 --delay 3000
  diecast reconcile inventory.csv --log audit.csv

The inventory needs "Toy #" and "Model Name" columns; "Brand" is optional.
"#)]
    Reconcile {
        /// Inventory CSV file
        #[arg(value_name = "INVENTORY")]
        inventory: PathBuf,

        /// Audit log file (overwritten)
        #[arg(long, default_value = "wiki_scraper_log.csv")]
        log: PathBuf,

        /// Look everything up but do not modify the inventory
        #[arg(long)]
        dry_run: bool,

        /// Only process the first N lookups
        #[arg(long)]
        limit: Option<usize>,

        /// Pause between lookups in milliseconds (overrides config)
        #[arg(long)]
        delay: Option<u64>,
    },

    /// Show or create the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    #[command(after_help = r#"Examples:
  diecast completions bash >> ~/.bashrc
  diecast completions zsh >> ~/.zshrc
  diecast completions fish > ~/.config/fish/completions/diecast.fish
"#)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the active configuration as TOML
    Show,

    /// Print the config file location
    Path,

    /// Write the default configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
