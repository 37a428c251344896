mod cli;
mod commands;
mod config;
mod error;
mod output;
mod pager;
mod terminal;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use admin_email_core::{FileRegistry, RegistryAdapter};

use crate::cli::{Cli, Command};
use crate::commands::RegistryCommand;
use crate::config::Settings;
use crate::error::CliError;
use crate::terminal::ConsoleTerminal;

fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli) {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let command = match cli.command {
        // Shell completions need no registry
        Some(Command::Completions(args)) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "admin-email", &mut std::io::stdout());
            return Ok(());
        }
        Some(Command::Set(args)) => RegistryCommand::Set(args),
        Some(Command::Get(args)) => RegistryCommand::Get(args),
        None => RegistryCommand::Interactive,
    };

    let config = config::load_config(&cli.global)?;
    let settings = Settings::resolve(&config, &cli.global);
    let path = config::registry_path(&config, &cli.global)?;

    let registry = FileRegistry::open(&path)?;
    tracing::debug!(path = %path.display(), "opened site registry");
    let mut adapter = RegistryAdapter::new(registry);
    let mut term = ConsoleTerminal::new(cli.global.color, cli.global.quiet);

    commands::dispatch(command, &mut adapter, &mut term, &settings, &cli.global)
}
