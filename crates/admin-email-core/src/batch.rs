// ── Batch and single-target updates ──
//
// Network-wide updates walk the registry in fixed-size batches and keep
// going past per-site failures. Single-target updates fail fast when the
// URL does not resolve.

use tracing::{debug, info, warn};

use crate::email::ValidEmail;
use crate::error::CoreError;
use crate::model::{ChangeOutcome, SiteChange, SiteId, UpdateOutcome};
use crate::registry::{RegistryAdapter, SiteScope};

pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Progress notifications emitted while a batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    /// Emitted once, before the first site.
    Started { total: usize },
    Previewed { url: String, from: String, to: String },
    Updated { url: String },
    Failed { url: String, reason: String },
}

/// Tally of a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub processed: usize,
    pub updated: usize,
    pub failures: Vec<UpdateOutcome>,
    pub dry_run: bool,
}

impl BatchSummary {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct BatchUpdater<'a> {
    adapter: &'a mut RegistryAdapter,
    batch_size: usize,
}

impl<'a> BatchUpdater<'a> {
    pub fn new(adapter: &'a mut RegistryAdapter, batch_size: usize) -> Self {
        Self {
            adapter,
            batch_size: batch_size.max(1),
        }
    }

    /// Apply `new_value` to every site in the network.
    ///
    /// A declined write is recorded in the summary and does not stop the
    /// remaining sites.
    pub fn update_all(
        &mut self,
        new_value: &ValidEmail,
        dry_run: bool,
        mut on_event: impl FnMut(BatchEvent),
    ) -> Result<BatchSummary, CoreError> {
        let total = self.adapter.count_sites()?;
        let mut summary = BatchSummary {
            total,
            dry_run,
            ..BatchSummary::default()
        };
        on_event(BatchEvent::Started { total });

        let mut offset = 0;
        while offset < total {
            let batch = self.adapter.site_records(offset, self.batch_size)?;
            debug!(offset, len = batch.len(), "processing batch");
            let short = batch.len() < self.batch_size;
            offset += batch.len();

            for record in batch {
                summary.processed += 1;
                let result = self
                    .adapter
                    .with_site(record.id, |scope| apply(scope, new_value, dry_run))
                    .and_then(|inner| inner);

                match result {
                    Ok((previous, ChangeOutcome::Previewed)) => on_event(BatchEvent::Previewed {
                        url: record.url,
                        from: previous,
                        to: new_value.to_string(),
                    }),
                    Ok((_, ChangeOutcome::Written)) => {
                        summary.updated += 1;
                        on_event(BatchEvent::Updated { url: record.url });
                    }
                    Ok((_, ChangeOutcome::Rejected)) => {
                        record_failure(&mut summary, &mut on_event, record.url, "write declined");
                    }
                    Err(err) => {
                        let reason = err.to_string();
                        record_failure(&mut summary, &mut on_event, record.url, &reason);
                    }
                }
            }

            if short {
                break;
            }
        }

        info!(
            total,
            updated = summary.updated,
            failures = summary.failures.len(),
            dry_run,
            "network update finished"
        );
        Ok(summary)
    }

    /// Apply `new_value` to the site at `url`.
    pub fn update_one(
        &mut self,
        url: &str,
        new_value: &ValidEmail,
        dry_run: bool,
    ) -> Result<SiteChange, CoreError> {
        let id = self
            .adapter
            .resolve_url(url)?
            .ok_or_else(|| CoreError::SiteNotFound { url: url.to_owned() })?;
        self.update_site(id, Some(url), new_value, dry_run)
    }

    /// Apply `new_value` to the main site of a single-site install.
    pub fn update_this_site(
        &mut self,
        new_value: &ValidEmail,
        dry_run: bool,
    ) -> Result<SiteChange, CoreError> {
        let id = self.adapter.main_site();
        self.update_site(id, None, new_value, dry_run)
    }

    fn update_site(
        &mut self,
        id: SiteId,
        label: Option<&str>,
        new_value: &ValidEmail,
        dry_run: bool,
    ) -> Result<SiteChange, CoreError> {
        self.adapter.with_site(id, |scope| -> Result<SiteChange, CoreError> {
            let url = match label {
                Some(label) => label.to_owned(),
                None => scope.url()?,
            };
            let (previous, outcome) = apply(scope, new_value, dry_run)?;
            Ok(SiteChange {
                url,
                previous,
                requested: new_value.to_string(),
                outcome,
            })
        })?
    }
}

/// Read the current value, then write unless this is a dry run.
fn apply(
    scope: &mut SiteScope<'_>,
    new_value: &ValidEmail,
    dry_run: bool,
) -> Result<(String, ChangeOutcome), CoreError> {
    let previous = scope.admin_email()?;
    if dry_run {
        return Ok((previous, ChangeOutcome::Previewed));
    }
    if scope.set_admin_email(new_value.as_str()) {
        Ok((previous, ChangeOutcome::Written))
    } else {
        warn!(site = %scope.id(), "admin email write declined");
        Ok((previous, ChangeOutcome::Rejected))
    }
}

fn record_failure(
    summary: &mut BatchSummary,
    on_event: &mut impl FnMut(BatchEvent),
    url: String,
    reason: &str,
) {
    summary.failures.push(UpdateOutcome {
        url: url.clone(),
        succeeded: false,
    });
    on_event(BatchEvent::Failed {
        url,
        reason: reason.to_owned(),
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::email::validate;
    use crate::registry::MemoryRegistry;

    fn network(n: u64) -> MemoryRegistry {
        let mut reg = MemoryRegistry::multisite();
        for i in 1..=n {
            reg.add_site(
                SiteId::new(i),
                format!("https://net.test/s{i}/"),
                format!("old{i}@net.test"),
            );
        }
        reg
    }

    #[test]
    fn updates_every_site_across_batches() {
        let backing = network(7);
        let mut adapter = RegistryAdapter::new(backing.clone());
        let email = validate("new@net.test").unwrap();

        let mut events = Vec::new();
        let summary = BatchUpdater::new(&mut adapter, 3)
            .update_all(&email, false, |e| events.push(e))
            .unwrap();

        assert!(summary.is_clean());
        assert_eq!(summary.updated, 7);
        assert_eq!(summary.processed, 7);
        assert_eq!(events[0], BatchEvent::Started { total: 7 });
        for i in 1..=7 {
            assert_eq!(backing.email_of(SiteId::new(i)).as_deref(), Some("new@net.test"));
        }
        assert_eq!(backing.context_depth(), 0);
    }

    #[test]
    fn one_failing_site_does_not_stop_the_rest() {
        let mut backing = network(5);
        backing.set_read_only(SiteId::new(3), true);
        let mut adapter = RegistryAdapter::new(backing.clone());
        let email = validate("new@net.test").unwrap();

        let summary = BatchUpdater::new(&mut adapter, DEFAULT_BATCH_SIZE)
            .update_all(&email, false, |_| {})
            .unwrap();

        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].url, "https://net.test/s3/");
        assert!(!summary.failures[0].succeeded);
        assert_eq!(summary.updated, 4);
        for i in [1, 2, 4, 5] {
            assert_eq!(backing.email_of(SiteId::new(i)).as_deref(), Some("new@net.test"));
        }
        assert_eq!(backing.email_of(SiteId::new(3)).as_deref(), Some("old3@net.test"));
    }

    #[test]
    fn dry_run_never_writes() {
        let backing = network(4);
        let mut adapter = RegistryAdapter::new(backing.clone());
        let email = validate("new@net.test").unwrap();
        let mut updater = BatchUpdater::new(&mut adapter, 2);

        let mut previews = 0;
        let summary = updater
            .update_all(&email, true, |e| {
                if matches!(e, BatchEvent::Previewed { .. }) {
                    previews += 1;
                }
            })
            .unwrap();
        updater
            .update_one("https://net.test/s2/", &email, true)
            .unwrap();
        updater.update_this_site(&email, true).unwrap();

        assert_eq!(previews, 4);
        assert_eq!(summary.updated, 0);
        assert_eq!(backing.write_calls(), 0);
        assert_eq!(backing.email_of(SiteId::new(1)).as_deref(), Some("old1@net.test"));
    }

    #[test]
    fn preview_reports_transition() {
        let mut adapter = RegistryAdapter::new(network(1));
        let email = validate("new@net.test").unwrap();
        let mut events = Vec::new();
        BatchUpdater::new(&mut adapter, 10)
            .update_all(&email, true, |e| events.push(e))
            .unwrap();
        assert_eq!(
            events[1],
            BatchEvent::Previewed {
                url: "https://net.test/s1/".into(),
                from: "old1@net.test".into(),
                to: "new@net.test".into(),
            }
        );
    }

    #[test]
    fn empty_network_is_a_clean_noop() {
        let mut adapter = RegistryAdapter::new(MemoryRegistry::multisite());
        let email = validate("new@net.test").unwrap();
        let summary = BatchUpdater::new(&mut adapter, 10)
            .update_all(&email, false, |_| {})
            .unwrap();
        assert_eq!(summary.total, 0);
        assert!(summary.is_clean());
    }

    #[test]
    fn update_one_unknown_url_fails_without_writing() {
        let backing = network(2);
        let mut adapter = RegistryAdapter::new(backing.clone());
        let email = validate("new@net.test").unwrap();
        let err = BatchUpdater::new(&mut adapter, 10)
            .update_one("https://elsewhere.test/", &email, false)
            .unwrap_err();
        assert!(matches!(err, CoreError::SiteNotFound { .. }));
        assert_eq!(backing.write_calls(), 0);
    }

    #[test]
    fn update_one_reports_rejection() {
        let mut backing = network(2);
        backing.set_read_only(SiteId::new(2), true);
        let mut adapter = RegistryAdapter::new(backing.clone());
        let email = validate("new@net.test").unwrap();
        let change = BatchUpdater::new(&mut adapter, 10)
            .update_one("net.test/s2", &email, false)
            .unwrap();
        assert_eq!(change.outcome, ChangeOutcome::Rejected);
        assert_eq!(change.previous, "old2@net.test");
        assert_eq!(backing.context_depth(), 0);
    }

    #[test]
    fn update_this_site_uses_site_url() {
        let backing = MemoryRegistry::single_site("https://solo.test/", "me@solo.test");
        let mut adapter = RegistryAdapter::new(backing.clone());
        let email = validate("you@solo.test").unwrap();
        let change = BatchUpdater::new(&mut adapter, 10)
            .update_this_site(&email, false)
            .unwrap();
        assert_eq!(change.url, "https://solo.test/");
        assert_eq!(change.outcome, ChangeOutcome::Written);
        assert_eq!(backing.email_of(SiteId::new(1)).as_deref(), Some("you@solo.test"));
    }
}
