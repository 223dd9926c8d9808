//! Miscellaneous commands: config, completions

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use colored::Colorize;
use std::io;
use std::path::PathBuf;

use diecast::cli::{Cli, CompletionShell};
use diecast::config::Config;
use diecast::error::Result;

/// Print the active configuration
pub fn cmd_config_show(config: &Config) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}

/// Print where the config file lives
pub fn cmd_config_path(path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(p) => p,
        None => Config::config_path()?,
    };
    let state = if path.exists() { "" } else { " (not created yet)" };
    println!("{}{}", path.display(), state.dimmed());
    Ok(())
}

/// Write the default configuration
pub fn cmd_config_init(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = match path {
        Some(p) => p,
        None => Config::config_path()?,
    };

    if path.exists() && !force {
        println!("Config already exists at {}", path.display());
        println!("Use {} to overwrite it.", "--force".yellow());
        return Ok(());
    }

    Config::default().save(&path)?;
    println!("{} Wrote default config to {}", "✓".green(), path.display());
    Ok(())
}

/// Generate shell completions
pub fn cmd_completions(shell: CompletionShell) -> Result<()> {
    let mut cmd = Cli::command();
    let shell = match shell {
        CompletionShell::Bash => Shell::Bash,
        CompletionShell::Zsh => Shell::Zsh,
        CompletionShell::Fish => Shell::Fish,
        CompletionShell::Powershell => Shell::PowerShell,
    };
    generate(shell, &mut cmd, "diecast", &mut io::stdout());
    Ok(())
}
