//! Shared helpers for command handlers: status rendering, confirmation,
//! applying a change and the help pager.

use std::slice;

use tracing::debug;

use admin_email_core::{
    BatchEvent, BatchSummary, BatchUpdater, ChangeOutcome, PendingChange, RegistryAdapter, Site,
    Target, load_help,
};

use crate::cli::OutputFormat;
use crate::config::Settings;
use crate::error::CliError;
use crate::output::{Columns, render_sites};
use crate::pager::page_lines;
use crate::terminal::{Progress, Terminal};

pub const NEXT_PAGE_PROMPT: &str = "[Enter] next page, [Q] quit";

// ── Status display ───────────────────────────────────────────────────

/// How a network listing is split for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingMode {
    /// One table per page, waiting for a key in between.
    Paged(usize),
    /// A single table, read from the registry `usize` sites at a time.
    Full(usize),
}

/// Show the current admin email: one row on a single site, the network
/// table on multisite.
pub fn render_current(
    adapter: &mut RegistryAdapter,
    term: &mut dyn Terminal,
    listing: ListingMode,
) -> Result<(), CliError> {
    if adapter.is_multisite() {
        return match listing {
            ListingMode::Paged(page_size) => render_network(adapter, term, page_size),
            ListingMode::Full(batch_size) => render_network_full(adapter, term, batch_size),
        };
    }

    let id = adapter.main_site();
    let site = Site {
        id,
        url: String::new(),
        admin_email: adapter.read_email(id)?,
    };
    let table = render_sites(OutputFormat::Table, slice::from_ref(&site), Columns::Email)?;
    term.line(&table);
    Ok(())
}

fn render_network(
    adapter: &mut RegistryAdapter,
    term: &mut dyn Terminal,
    page_size: usize,
) -> Result<(), CliError> {
    let mut shown = 0;
    for page in adapter.pages(page_size) {
        let page = page?;
        shown += page.items.len();
        term.line(&render_sites(
            OutputFormat::Table,
            &page.items,
            Columns::UrlAndEmail,
        )?);

        if page.is_last() {
            break;
        }
        term.line(&format!(
            "Showing {}–{} of {}",
            page.start(),
            page.end(),
            page.total
        ));
        let action = term.prompt(NEXT_PAGE_PROMPT)?;
        if action.trim().eq_ignore_ascii_case("q") {
            debug!(shown, "listing stopped early");
            break;
        }
    }

    if shown == 0 {
        term.line("No sites found.");
    }
    Ok(())
}

fn render_network_full(
    adapter: &mut RegistryAdapter,
    term: &mut dyn Terminal,
    batch_size: usize,
) -> Result<(), CliError> {
    let mut sites = Vec::new();
    for page in adapter.pages(batch_size) {
        sites.extend(page?.items);
    }

    if sites.is_empty() {
        term.line("No sites found.");
    } else {
        term.line(&render_sites(
            OutputFormat::Table,
            &sites,
            Columns::UrlAndEmail,
        )?);
    }
    Ok(())
}

// ── Confirmation ─────────────────────────────────────────────────────

/// Print the change summary and ask to continue. Declining aborts the
/// whole command.
pub fn confirm_or_abort(term: &mut dyn Terminal, change: &PendingChange) -> Result<(), CliError> {
    term.notice("");
    term.notice(&format!("Target: {}", change.target));
    term.notice(&format!("Email: {}", change.new_email));
    term.notice(&format!("Mode: {}", change.mode_label()));

    if term.confirm("Continue?")? {
        Ok(())
    } else {
        Err(CliError::Aborted)
    }
}

// ── Applying ─────────────────────────────────────────────────────────

/// Carry out a confirmed (or non-interactive) change.
///
/// Single-target writes that the registry declines are fatal; per-site
/// failures of a network update are reported and tolerated.
pub fn apply_change(
    adapter: &mut RegistryAdapter,
    term: &mut dyn Terminal,
    settings: &Settings,
    change: &PendingChange,
) -> Result<(), CliError> {
    let mut updater = BatchUpdater::new(adapter, settings.batch_size);
    let email = &change.new_email;

    match &change.target {
        Target::ThisSite => {
            let result = updater.update_this_site(email, change.dry_run)?;
            match result.outcome {
                ChangeOutcome::Previewed => term.line(&format!(
                    "[DRY RUN] Would update admin_email from '{}' to '{}'.",
                    result.previous, result.requested
                )),
                ChangeOutcome::Written => {
                    term.success(&format!("Updated admin_email to {}.", result.requested));
                }
                ChangeOutcome::Rejected => {
                    return Err(CliError::WriteDeclined { url: result.url });
                }
            }
        }
        Target::OneSite(url) => {
            let result = updater.update_one(url, email, change.dry_run)?;
            match result.outcome {
                ChangeOutcome::Previewed => term.line(&format!(
                    "[DRY RUN] {}: '{}' → '{}'",
                    result.url, result.previous, result.requested
                )),
                ChangeOutcome::Written => {
                    term.success(&format!("Updated {} to {}", result.url, result.requested));
                }
                ChangeOutcome::Rejected => {
                    return Err(CliError::WriteDeclined { url: result.url });
                }
            }
        }
        Target::AllSites => {
            let summary = run_batch(&mut updater, term, change)?;
            report_summary(term, &summary);
        }
    }
    Ok(())
}

fn run_batch(
    updater: &mut BatchUpdater<'_>,
    term: &mut dyn Terminal,
    change: &PendingChange,
) -> Result<BatchSummary, CliError> {
    let dry_run = change.dry_run;
    let mut progress: Option<Box<dyn Progress>> = None;

    let summary = updater.update_all(&change.new_email, dry_run, |event| match event {
        BatchEvent::Started { total } => {
            if !dry_run && total > 1 {
                progress = Some(term.progress(u64::try_from(total).unwrap_or(u64::MAX)));
            }
        }
        BatchEvent::Previewed { url, from, to } => {
            term.line(&format!("[DRY RUN] {url}: '{from}' → '{to}'"));
        }
        BatchEvent::Updated { url } => {
            let text = format!("Updated {url}");
            match progress.as_mut() {
                Some(bar) => {
                    bar.println(&text);
                    bar.inc();
                }
                None => term.line(&text),
            }
        }
        BatchEvent::Failed { url, reason } => {
            debug!(%url, %reason, "site update failed");
            if let Some(bar) = progress.as_mut() {
                bar.inc();
            }
        }
    });

    if let Some(mut bar) = progress {
        bar.finish();
    }
    summary.map_err(CliError::from)
}

fn report_summary(term: &mut dyn Terminal, summary: &BatchSummary) {
    if summary.dry_run {
        term.line(&format!(
            "[DRY RUN] {} site(s) would be updated.",
            summary.processed
        ));
    } else if summary.is_clean() {
        term.success("Network update complete.");
    } else {
        term.warning(&format!(
            "Network update finished with {} failure(s).",
            summary.failures.len()
        ));
        for failure in &summary.failures {
            term.line(&format!("  - {}", failure.url));
        }
    }
}

// ── Help ─────────────────────────────────────────────────────────────

/// Page the README with its table of contents. A missing file only warns.
pub fn show_help(term: &mut dyn Terminal, settings: &Settings) -> Result<(), CliError> {
    let Some(doc) = load_help(&settings.help_candidates) else {
        term.warning("README.md not found or not readable.");
        return Ok(());
    };
    debug!(path = %doc.path.display(), headings = doc.toc.len(), "loaded help document");
    page_lines(term, &doc.pager_lines(), settings.pages.help)
}
