//! `vaultkeep reset` — delete the vault file.

use crate::cli::output;
use crate::cli::{controller, Cli};
use crate::errors::Result;
use crate::vault::{ResetOutcome, VaultController};

/// Execute the `reset` command.
///
/// Does not need the secret: the file is removed as a whole.
pub fn execute(cli: &Cli, confirm: Option<&str>) -> Result<()> {
    if !confirmed(confirm) {
        return Ok(());
    }
    let mut controller = controller()?;
    report(controller.reset_file(&cli.output)?);
    Ok(())
}

/// Reset the vault tracked by `controller`.
pub fn run(controller: &mut VaultController, confirm: Option<&str>) -> Result<()> {
    if !confirmed(confirm) {
        return Ok(());
    }
    report(controller.reset()?);
    Ok(())
}

fn confirmed(confirm: Option<&str>) -> bool {
    if confirm == Some("confirm") {
        return true;
    }
    output::warning(
        "Resetting the vault means complete deletion. Use `reset confirm` to confirm.",
    );
    false
}

fn report(outcome: ResetOutcome) {
    match outcome {
        ResetOutcome::Removed(path) => {
            output::success(&format!("Vault removed: {}", path.display()));
        }
        ResetOutcome::NothingToRemove(path) => {
            output::info(&format!("Nothing to remove at {}", path.display()));
        }
    }
}
