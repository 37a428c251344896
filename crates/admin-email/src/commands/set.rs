//! `admin-email set <email>`: non-interactive update.

use tracing::debug;

use admin_email_core::{PendingChange, RegistryAdapter, Target, validate};

use super::util::{ListingMode, apply_change, render_current};
use crate::cli::SetArgs;
use crate::config::Settings;
use crate::error::CliError;
use crate::terminal::Terminal;

/// Which sites `--network` / `--url` select on a multisite network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetScope {
    None,
    Network,
    Url(String),
}

impl SetScope {
    /// Passing both flags is a usage error.
    pub fn from_flags(network: bool, url: Option<&str>) -> Result<Self, CliError> {
        let url = url.map(str::trim).filter(|u| !u.is_empty());
        match (network, url) {
            (true, Some(_)) => Err(CliError::AmbiguousScope),
            (true, None) => Ok(Self::Network),
            (false, Some(url)) => Ok(Self::Url(url.to_owned())),
            (false, None) => Ok(Self::None),
        }
    }

    pub fn into_target(self) -> Result<Target, CliError> {
        match self {
            Self::None => Err(CliError::AmbiguousScope),
            Self::Network => Ok(Target::AllSites),
            Self::Url(url) => Ok(Target::OneSite(url)),
        }
    }
}

/// Validate, resolve the scope, then apply. Nothing is touched until all
/// of the input has been checked.
pub fn handle(
    args: &SetArgs,
    adapter: &mut RegistryAdapter,
    term: &mut dyn Terminal,
    settings: &Settings,
) -> Result<(), CliError> {
    let raw = args.email.trim();
    if raw.is_empty() {
        return Err(CliError::EmailRequired);
    }
    let new_email = validate(raw)?;

    let target = if adapter.is_multisite() {
        SetScope::from_flags(args.network, args.url.as_deref())?.into_target()?
    } else {
        Target::ThisSite
    };
    debug!(%target, dry_run = settings.dry_run, "set admin email");

    let change = PendingChange {
        new_email,
        target,
        dry_run: settings.dry_run,
    };
    apply_change(adapter, term, settings, &change)?;

    // Nobody is there to page through a scripted run.
    if !change.dry_run {
        render_current(adapter, term, ListingMode::Full(settings.batch_size))?;
    }
    Ok(())
}
