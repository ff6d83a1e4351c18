//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use clap::Parser;

use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{Result, VaultError};
use crate::vault::VaultController;

/// VaultKeep CLI: encrypted credential vault.
#[derive(Parser)]
#[command(
    name = "vaultkeep",
    about = "Encrypted credential vault stored as JSON",
    version,
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault file, must end in .json (default: vault.json)
    #[arg(short, long, global = true, default_value = "")]
    pub output: String,

    /// Vault secret (prompted for when omitted)
    #[arg(
        short,
        long,
        global = true,
        env = "VAULTKEEP_PASSWORD",
        hide_env_values = true
    )]
    pub secret: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create the vault, or check the secret of an existing one
    Setup,

    /// Store credentials for a site (add or replace)
    Add {
        /// Username to store
        #[arg(short, long)]
        username: String,
        /// Password to store (omit for interactive prompt)
        #[arg(short, long)]
        password: Option<String>,
        /// Site the credentials belong to
        #[arg(short = 'w', long)]
        site: String,
    },

    /// Decrypt and print the credentials for a site
    Show {
        /// Site label
        site: String,
    },

    /// List the sites stored in the vault
    List,

    /// Delete the vault file (pass `confirm` to proceed)
    Reset {
        /// Must be the word `confirm`
        confirm: Option<String>,
    },

    /// Describe a command
    Help {
        /// Command to describe
        command: Option<String>,
    },

    /// Interactive session that stays unlocked between commands
    Shell,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Get the vault secret, trying in order:
/// 1. The `--secret` flag or `VAULTKEEP_PASSWORD` env var
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the secret is wiped from memory on drop.
pub fn prompt_secret(given: Option<&str>) -> Result<Zeroizing<String>> {
    if let Some(secret) = given {
        if !secret.is_empty() {
            return Ok(Zeroizing::new(secret.to_string()));
        }
    }

    let secret = dialoguer::Password::new()
        .with_prompt("Enter vault secret")
        .interact()
        .map_err(|e| VaultError::InvalidInput(format!("secret prompt: {e}")))?;
    Ok(Zeroizing::new(secret))
}

/// Prompt for a value that was not given on the command line.
pub fn prompt_hidden(given: Option<&str>, prompt: &str) -> Result<Zeroizing<String>> {
    match given {
        Some(value) => {
            output::warning("Value provided on command line — it may appear in shell history.");
            Ok(Zeroizing::new(value.to_string()))
        }
        None => {
            let value = dialoguer::Password::new()
                .with_prompt(prompt)
                .allow_empty_password(true)
                .interact()
                .map_err(|e| VaultError::InvalidInput(format!("input prompt: {e}")))?;
            Ok(Zeroizing::new(value))
        }
    }
}

/// Build a controller for the current directory, honouring `.vaultkeep.toml`.
pub fn controller() -> Result<VaultController> {
    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;
    Ok(VaultController::with_settings(cwd, &settings))
}

/// Build a controller and unlock the existing vault named by the CLI's
/// output file.  Only `setup` creates vaults.
pub fn unlocked_controller(cli: &Cli) -> Result<VaultController> {
    let mut controller = controller()?;
    let secret = prompt_secret(cli.secret.as_deref())?;
    controller.unlock(secret.as_bytes(), &cli.output)?;
    Ok(controller)
}
