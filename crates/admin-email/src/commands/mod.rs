//! Command dispatch: bridges CLI args -> registry adapter -> terminal output.

pub mod get;
pub mod interactive;
pub mod set;
pub mod util;

use admin_email_core::RegistryAdapter;

use crate::cli::{GetArgs, GlobalOpts, SetArgs};
use crate::config::Settings;
use crate::error::CliError;
use crate::terminal::Terminal;

/// A command that needs an open site registry.
#[derive(Debug)]
pub enum RegistryCommand {
    Interactive,
    Set(SetArgs),
    Get(GetArgs),
}

pub fn dispatch(
    cmd: RegistryCommand,
    adapter: &mut RegistryAdapter,
    term: &mut dyn Terminal,
    settings: &Settings,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        RegistryCommand::Interactive => interactive::run(adapter, term, settings),
        RegistryCommand::Set(args) => set::handle(&args, adapter, term, settings),
        RegistryCommand::Get(args) => get::handle(&args, adapter, settings, global.quiet),
    }
}
