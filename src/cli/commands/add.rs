//! `vaultkeep add` — store credentials for a site.

use crate::cli::output;
use crate::cli::{prompt_hidden, unlocked_controller, Cli};
use crate::errors::Result;
use crate::vault::VaultController;

/// Execute the `add` command.
pub fn execute(cli: &Cli, username: &str, password: Option<&str>, site: &str) -> Result<()> {
    let password = prompt_hidden(password, &format!("Enter password for {site}"))?;
    let mut controller = unlocked_controller(cli)?;
    run(&mut controller, username, &password, site)
}

/// Encrypt and store the credentials in the unlocked vault.
pub fn run(
    controller: &mut VaultController,
    username: &str,
    password: &str,
    site: &str,
) -> Result<()> {
    controller.add(username, password, site)?;
    output::success(&format!("Credentials for '{site}' saved."));
    Ok(())
}
