use clap::Parser;
use tracing_subscriber::EnvFilter;
use vaultkeep::cli::commands;
use vaultkeep::cli::{Cli, Commands};

fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Setup => commands::setup::execute(&cli),
        Commands::Add {
            username,
            password,
            site,
        } => commands::add::execute(&cli, username, password.as_deref(), site),
        Commands::Show { site } => commands::show::execute(&cli, site),
        Commands::List => commands::list::execute(&cli),
        Commands::Reset { confirm } => commands::reset::execute(&cli, confirm.as_deref()),
        Commands::Help { command } => commands::help::execute(command.as_deref()),
        Commands::Shell => commands::shell::execute(&cli),
    };

    if let Err(e) = result {
        vaultkeep::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

/// Log to stderr, filtered by `VAULTKEEP_LOG` (default: warnings only).
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("VAULTKEEP_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
