//! One module per subcommand.
//!
//! Each module has an `execute` entry point for one-shot use and, where the
//! command needs an unlocked vault, a `run` function the interactive shell
//! calls with its long-lived controller.

pub mod add;
pub mod help;
pub mod list;
pub mod reset;
pub mod setup;
pub mod shell;
pub mod show;
