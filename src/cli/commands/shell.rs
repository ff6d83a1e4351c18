//! `vaultkeep shell` — interactive session.
//!
//! Reads one command per line from stdin and runs it against a single
//! controller, so the vault stays unlocked between `setup` and the
//! commands that follow it.

use std::io::{self, BufRead, Write};

use clap::Parser;

use crate::cli::output;
use crate::cli::{controller, prompt_hidden, prompt_secret, Cli};
use crate::errors::{Result, VaultError};
use crate::vault::VaultState;

/// One line typed into the shell.
#[derive(Parser)]
#[command(no_binary_name = true, disable_help_subcommand = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(clap::Subcommand)]
enum ShellCommand {
    /// Unlock (or create) a vault
    Setup {
        #[arg(short, long)]
        secret: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Store credentials for a site
    Add {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: Option<String>,
        #[arg(short = 'w', long)]
        site: String,
    },
    /// Decrypt the credentials for a site
    Show { site: String },
    /// List stored sites
    List,
    /// Delete the vault file
    Reset { confirm: Option<String> },
    /// Describe a command
    Help { command: Option<String> },
    /// Leave the shell
    #[command(alias = "quit")]
    Exit,
}

/// Execute the `shell` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut controller = controller()?;

    output::info("Vault shell is running. Type `help` for commands, `exit` to leave.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }

        let parsed = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed,
            Err(e) => {
                let _ = e.print();
                continue;
            }
        };

        let result = match parsed.command {
            ShellCommand::Setup {
                secret,
                output: file,
            } => {
                let secret = secret.or_else(|| cli.secret.clone());
                let vault_file = file.unwrap_or_else(|| cli.output.clone());
                prompt_secret(secret.as_deref()).and_then(|secret| {
                    super::setup::run(&mut controller, secret.as_bytes(), &vault_file)
                })
            }
            ShellCommand::Add {
                username,
                password,
                site,
            } => {
                if controller.state() == VaultState::Unlocked {
                    let prompt = format!("Enter password for {site}");
                    prompt_hidden(password.as_deref(), &prompt).and_then(|password| {
                        super::add::run(&mut controller, &username, &password, &site)
                    })
                } else {
                    Err(VaultError::NotUnlocked)
                }
            }
            ShellCommand::Show { site } => super::show::run(&controller, &site),
            ShellCommand::List => super::list::run(&controller),
            ShellCommand::Reset { confirm } => {
                super::reset::run(&mut controller, confirm.as_deref())
            }
            ShellCommand::Help { command } => super::help::execute(command.as_deref()),
            ShellCommand::Exit => break,
        };

        if let Err(e) = result {
            output::error(&e.to_string());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn shell_grammar_is_consistent() {
        ShellLine::command().debug_assert();
    }

    #[test]
    fn parses_setup_line() {
        let line = ShellLine::try_parse_from(["setup", "-s", "secret", "-o", "test.json"]).unwrap();
        match line.command {
            ShellCommand::Setup { secret, output } => {
                assert_eq!(secret.as_deref(), Some("secret"));
                assert_eq!(output.as_deref(), Some("test.json"));
            }
            _ => panic!("expected setup"),
        }
    }

    #[test]
    fn quit_is_an_alias_for_exit() {
        let line = ShellLine::try_parse_from(["quit"]).unwrap();
        assert!(matches!(line.command, ShellCommand::Exit));
    }
}
