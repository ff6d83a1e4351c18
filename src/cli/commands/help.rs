//! `vaultkeep help` — describe a command.

use crate::errors::Result;
use crate::help::{command_overview, describe_command};

/// Execute the `help` command.
pub fn execute(command: Option<&str>) -> Result<()> {
    match command {
        None => {
            println!("usage:\n\tvaultkeep help <command>\n");
            println!("{}", command_overview());
        }
        Some(name) => println!("{}", describe_command(name)?),
    }
    Ok(())
}
