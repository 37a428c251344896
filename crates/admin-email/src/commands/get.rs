//! `admin-email get`: print the current admin email(s).

use admin_email_core::{CoreError, Page, RegistryAdapter, Site, SiteId};

use crate::cli::GetArgs;
use crate::config::Settings;
use crate::error::CliError;
use crate::output::{Columns, print_output, render_sites};

pub fn handle(
    args: &GetArgs,
    adapter: &mut RegistryAdapter,
    settings: &Settings,
    quiet: bool,
) -> Result<(), CliError> {
    let (sites, columns) = collect(args, adapter, settings.batch_size)?;
    let out = render_sites(args.format, &sites, columns)?;
    print_output(&out, quiet);
    Ok(())
}

/// The sites `args` select, read-only.
fn collect(
    args: &GetArgs,
    adapter: &mut RegistryAdapter,
    batch_size: usize,
) -> Result<(Vec<Site>, Columns), CliError> {
    if !adapter.is_multisite() {
        let id = adapter.main_site();
        return Ok((vec![current_site(adapter, id)?], Columns::Email));
    }

    if let Some(url) = args.url.as_deref() {
        let id = adapter
            .resolve_url(url)?
            .ok_or_else(|| CliError::SiteNotFound { url: url.to_owned() })?;
        return Ok((vec![current_site(adapter, id)?], Columns::UrlAndEmail));
    }

    let pages: Vec<Page> = adapter.pages(batch_size).collect::<Result<_, _>>()?;
    let sites = pages.into_iter().flat_map(|page| page.items).collect();
    Ok((sites, Columns::UrlAndEmail))
}

fn current_site(adapter: &mut RegistryAdapter, id: SiteId) -> Result<Site, CliError> {
    let site = adapter.with_site(id, |scope| -> Result<Site, CoreError> {
        Ok(Site {
            id,
            url: scope.url()?,
            admin_email: scope.admin_email()?,
        })
    })??;
    Ok(site)
}
