//! `vaultkeep list` — show the stored site labels.

use crate::cli::output;
use crate::cli::{unlocked_controller, Cli};
use crate::errors::Result;
use crate::vault::VaultController;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let controller = unlocked_controller(cli)?;
    run(&controller)
}

pub fn run(controller: &VaultController) -> Result<()> {
    let sites = controller.sites()?;
    output::print_sites_table(&sites);
    Ok(())
}
