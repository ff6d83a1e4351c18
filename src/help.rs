//! Help texts for the vault commands.

use crate::errors::{Result, VaultError};

/// Commands understood by the front end, in display order.
pub const AVAILABLE_COMMANDS: [&str; 6] = ["setup", "add", "show", "list", "reset", "help"];

const SETUP_HELP: &str = "\
usage:
\tvaultkeep setup [-s secret] [-o output.json]

setup unlocks the vault with the given secret, creating the vault file on
first use. The output file must have a single .json extension and defaults
to vault.json.";

const ADD_HELP: &str = "\
usage:
\tvaultkeep add -u <username> -p <password> -w <site>

add encrypts the username and password and stores them under the site,
replacing any credentials already stored for it. Requires setup first.";

const SHOW_HELP: &str = "\
usage:
\tvaultkeep show <site>

show decrypts and prints the credentials stored for the site.";

const LIST_HELP: &str = "\
usage:
\tvaultkeep list

list prints the sites stored in the vault without decrypting anything.";

const RESET_HELP: &str = "\
usage:
\tvaultkeep reset confirm

reset removes the vault file, deleting the secret and all saved data.";

const HELP_HELP: &str = "\
usage:
\tvaultkeep help <command>

help describes a command.";

/// Return the help text for `name`.
pub fn describe_command(name: &str) -> Result<&'static str> {
    match name {
        "setup" => Ok(SETUP_HELP),
        "add" => Ok(ADD_HELP),
        "show" => Ok(SHOW_HELP),
        "list" => Ok(LIST_HELP),
        "reset" => Ok(RESET_HELP),
        "help" => Ok(HELP_HELP),
        _ => Err(VaultError::UnknownCommand {
            name: name.to_string(),
            available: AVAILABLE_COMMANDS.join(", "),
        }),
    }
}

/// One-line summary listing every command.
pub fn command_overview() -> String {
    format!(
        "the commands available are: {}",
        AVAILABLE_COMMANDS.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_command_has_help() {
        for name in AVAILABLE_COMMANDS {
            let text = describe_command(name).unwrap();
            assert!(text.contains(name), "help for {name} should mention it");
        }
    }

    #[test]
    fn unknown_command_lists_available_ones() {
        let err = describe_command("init").unwrap_err();
        assert!(matches!(err, VaultError::UnknownCommand { .. }));
        let msg = err.to_string();
        assert!(msg.contains("init"));
        assert!(msg.contains("setup, add, show, list, reset, help"));
    }
}
