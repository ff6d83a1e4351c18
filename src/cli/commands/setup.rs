//! `vaultkeep setup` — create the vault or check its secret.

use crate::cli::output;
use crate::cli::{controller, prompt_secret, Cli};
use crate::errors::Result;
use crate::vault::VaultController;

/// Execute the `setup` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut controller = controller()?;
    let secret = prompt_secret(cli.secret.as_deref())?;
    run(&mut controller, secret.as_bytes(), &cli.output)
}

/// Unlock `controller` with `secret`, creating the vault on first use.
pub fn run(controller: &mut VaultController, secret: &[u8], vault_file: &str) -> Result<()> {
    let vault = controller.setup(secret, vault_file)?;
    output::success(&format!(
        "Vault initialised. Output file: {}",
        vault.path().display()
    ));
    Ok(())
}
