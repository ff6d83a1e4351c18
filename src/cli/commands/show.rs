//! `vaultkeep show` — decrypt and print the credentials for a site.

use crate::cli::{unlocked_controller, Cli};
use crate::errors::Result;
use crate::vault::VaultController;

/// Execute the `show` command.
pub fn execute(cli: &Cli, site: &str) -> Result<()> {
    let controller = unlocked_controller(cli)?;
    run(&controller, site)
}

/// Print the decrypted username and password to stdout.
pub fn run(controller: &VaultController, site: &str) -> Result<()> {
    let credential = controller.reveal(site)?;
    println!("username: {}", credential.username);
    println!("password: {}", credential.password.as_str());
    Ok(())
}
