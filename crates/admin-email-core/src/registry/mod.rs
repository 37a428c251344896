// ── Site registry ──
//
// `SiteRegistry` is the raw collaborator: it owns a process-wide "current
// site" that must be switched and restored around every option access.
// `RegistryAdapter` is the only consumer of that switch. It hands out a
// `SiteScope` guard whose `Drop` restores the previous context, so every
// exit path (including `?` and panics) releases it.

mod file;
mod memory;

pub use file::{FileRegistry, NetworkFile, SiteEntry};
pub use memory::MemoryRegistry;

use tracing::debug;
use url::Url;

use crate::error::CoreError;
use crate::model::{ADMIN_EMAIL_OPTION, Page, Site, SiteId, SiteRecord};

/// Multi-tenant site registry primitives.
pub trait SiteRegistry {
    fn is_multisite(&self) -> bool;

    /// The site addressed by single-site operations.
    fn main_site(&self) -> SiteId;

    fn count_sites(&self) -> Result<usize, CoreError>;

    /// At most `limit` index entries starting at `offset`, in stable order.
    fn sites(&self, offset: usize, limit: usize) -> Result<Vec<SiteRecord>, CoreError>;

    /// Exact URL lookup. Fuzzy matching is layered on by the adapter.
    fn lookup_url(&self, url: &str) -> Result<Option<SiteId>, CoreError>;

    /// Make `id` the current site. Must be paired with [`restore`](Self::restore).
    fn switch_to(&mut self, id: SiteId) -> Result<(), CoreError>;

    /// Return to the site that was current before the last switch.
    fn restore(&mut self);

    /// URL of the current site.
    fn current_url(&self) -> Result<String, CoreError>;

    fn get_option(&self, key: &str) -> Result<Option<String>, CoreError>;

    /// Returns `false` when the registry declines the write.
    fn update_option(&mut self, key: &str, value: &str) -> bool;
}

// ── Adapter ─────────────────────────────────────────────────────────

/// Scoped, context-safe access to a [`SiteRegistry`].
pub struct RegistryAdapter {
    registry: Box<dyn SiteRegistry>,
}

impl RegistryAdapter {
    pub fn new(registry: impl SiteRegistry + 'static) -> Self {
        Self {
            registry: Box::new(registry),
        }
    }

    pub fn is_multisite(&self) -> bool {
        self.registry.is_multisite()
    }

    pub fn main_site(&self) -> SiteId {
        self.registry.main_site()
    }

    pub fn count_sites(&self) -> Result<usize, CoreError> {
        self.registry.count_sites()
    }

    /// Run `f` with `id` as the current site, restoring afterwards.
    pub fn with_site<T>(
        &mut self,
        id: SiteId,
        f: impl FnOnce(&mut SiteScope<'_>) -> T,
    ) -> Result<T, CoreError> {
        self.registry.switch_to(id)?;
        debug!(site = %id, "switched site context");
        let mut scope = SiteScope {
            id,
            registry: self.registry.as_mut(),
        };
        Ok(f(&mut scope))
    }

    /// Read one site's admin email.
    pub fn read_email(&mut self, id: SiteId) -> Result<String, CoreError> {
        self.with_site(id, |scope| scope.admin_email())?
    }

    /// Write one site's admin email. `Ok(false)` means the write was declined.
    pub fn write_email(&mut self, id: SiteId, value: &str) -> Result<bool, CoreError> {
        self.with_site(id, |scope| scope.set_admin_email(value))
    }

    /// Index entries `[offset, offset + limit)`, without switching context.
    pub fn site_records(&self, offset: usize, limit: usize) -> Result<Vec<SiteRecord>, CoreError> {
        self.registry.sites(offset, limit)
    }

    /// Sites `[offset, offset + limit)` with their current admin email.
    pub fn list_sites(&mut self, offset: usize, limit: usize) -> Result<Vec<Site>, CoreError> {
        let records = self.site_records(offset, limit)?;
        let mut sites = Vec::with_capacity(records.len());
        for record in records {
            let admin_email = self.read_email(record.id)?;
            sites.push(Site {
                id: record.id,
                url: record.url,
                admin_email,
            });
        }
        Ok(sites)
    }

    /// Resolve a site URL: exact match, then host + path.
    pub fn resolve_url(&mut self, url: &str) -> Result<Option<SiteId>, CoreError> {
        let url = url.trim();
        if let Some(id) = self.registry.lookup_url(url)? {
            return Ok(Some(id));
        }

        let Some(wanted) = HostPath::parse(url) else {
            return Ok(None);
        };
        debug!(%url, "exact lookup missed, matching on host and path");

        let total = self.registry.count_sites()?;
        let mut offset = 0;
        while offset < total {
            let batch = self.registry.sites(offset, FALLBACK_SCAN_BATCH)?;
            if batch.is_empty() {
                break;
            }
            offset += batch.len();
            if let Some(record) = batch
                .into_iter()
                .find(|r| HostPath::parse(&r.url).as_ref() == Some(&wanted))
            {
                return Ok(Some(record.id));
            }
        }
        Ok(None)
    }

    /// Iterate the network page by page.
    pub fn pages(&mut self, page_size: usize) -> Pages<'_> {
        Pages {
            adapter: self,
            page_size: page_size.max(1),
            offset: 0,
            total: None,
            done: false,
        }
    }
}

const FALLBACK_SCAN_BATCH: usize = 100;

// ── Scope guard ─────────────────────────────────────────────────────

/// The current site context. Restores the previous one on drop.
pub struct SiteScope<'a> {
    id: SiteId,
    registry: &'a mut (dyn SiteRegistry + 'static),
}

impl SiteScope<'_> {
    pub fn id(&self) -> SiteId {
        self.id
    }

    pub fn url(&self) -> Result<String, CoreError> {
        self.registry.current_url()
    }

    pub fn admin_email(&self) -> Result<String, CoreError> {
        Ok(self
            .registry
            .get_option(ADMIN_EMAIL_OPTION)?
            .unwrap_or_default())
    }

    pub fn set_admin_email(&mut self, value: &str) -> bool {
        self.registry.update_option(ADMIN_EMAIL_OPTION, value)
    }
}

impl Drop for SiteScope<'_> {
    fn drop(&mut self) {
        self.registry.restore();
        debug!(site = %self.id, "restored site context");
    }
}

// ── Paging ──────────────────────────────────────────────────────────

/// Forward iterator over network pages. Stops after a short page.
pub struct Pages<'a> {
    adapter: &'a mut RegistryAdapter,
    page_size: usize,
    offset: usize,
    total: Option<usize>,
    done: bool,
}

impl Iterator for Pages<'_> {
    type Item = Result<Page, CoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let total = match self.total {
            Some(total) => total,
            None => match self.adapter.count_sites() {
                Ok(total) => *self.total.insert(total),
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            },
        };
        if self.offset >= total {
            self.done = true;
            return None;
        }

        let items = match self.adapter.list_sites(self.offset, self.page_size) {
            Ok(items) => items,
            Err(err) => {
                self.done = true;
                return Some(Err(err));
            }
        };
        if items.is_empty() {
            self.done = true;
            return None;
        }

        let page = Page {
            offset: self.offset,
            size: self.page_size,
            total,
            items,
        };
        debug!(offset = page.offset, len = page.items.len(), total, "fetched page");
        self.offset = page.end();
        self.done = page.is_last();
        Some(Ok(page))
    }
}

// ── URL matching ────────────────────────────────────────────────────

/// Host and normalised path of a site URL; the scheme is ignored.
#[derive(Debug, PartialEq, Eq)]
struct HostPath {
    host: String,
    path: String,
}

impl HostPath {
    fn parse(raw: &str) -> Option<Self> {
        let parsed = Url::parse(raw)
            .ok()
            .filter(Url::has_host)
            .or_else(|| Url::parse(&format!("http://{raw}")).ok())?;
        let host = parsed.host_str()?.to_ascii_lowercase();
        let path = parsed.path().trim_end_matches('/').to_owned();
        Some(Self { host, path })
    }
}
