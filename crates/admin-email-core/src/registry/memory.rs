// ── In-memory registry ──
//
// Ordered site list plus a context stack mirroring switch/restore. Clones
// share state, so a test can keep a handle for inspection after moving a
// clone into a `RegistryAdapter`.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::{info, warn};

use crate::error::CoreError;
use crate::model::{ADMIN_EMAIL_OPTION, SiteId, SiteRecord};

use super::SiteRegistry;

#[derive(Debug, Clone)]
struct SiteSlot {
    id: SiteId,
    url: String,
    options: BTreeMap<String, String>,
    read_only: bool,
    /// Writes report success but are dropped.
    swallow_writes: bool,
}

#[derive(Debug, Default)]
struct State {
    multisite: bool,
    sites: Vec<SiteSlot>,
    stack: Vec<SiteId>,
    switches: usize,
    writes: usize,
}

impl State {
    fn main_site(&self) -> SiteId {
        self.sites.first().map_or(SiteId::new(1), |s| s.id)
    }

    fn current(&self) -> SiteId {
        self.stack.last().copied().unwrap_or_else(|| self.main_site())
    }

    fn slot(&self, id: SiteId) -> Option<&SiteSlot> {
        self.sites.iter().find(|s| s.id == id)
    }

    fn slot_mut(&mut self, id: SiteId) -> Option<&mut SiteSlot> {
        self.sites.iter_mut().find(|s| s.id == id)
    }
}

/// A [`SiteRegistry`] held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    state: Rc<RefCell<State>>,
}

impl MemoryRegistry {
    /// An empty multisite network.
    pub fn multisite() -> Self {
        let registry = Self::default();
        registry.state.borrow_mut().multisite = true;
        registry
    }

    /// A single-site install with one site.
    pub fn single_site(url: impl Into<String>, admin_email: impl Into<String>) -> Self {
        let mut registry = Self::default();
        registry.add_site(SiteId::new(1), url, admin_email);
        registry
    }

    pub fn add_site(
        &mut self,
        id: SiteId,
        url: impl Into<String>,
        admin_email: impl Into<String>,
    ) -> &mut Self {
        let mut options = BTreeMap::new();
        options.insert(ADMIN_EMAIL_OPTION.to_owned(), admin_email.into());
        self.state.borrow_mut().sites.push(SiteSlot {
            id,
            url: url.into(),
            options,
            read_only: false,
            swallow_writes: false,
        });
        self
    }

    /// Make writes to `id` fail.
    pub fn set_read_only(&mut self, id: SiteId, read_only: bool) -> &mut Self {
        if let Some(slot) = self.state.borrow_mut().slot_mut(id) {
            slot.read_only = read_only;
        }
        self
    }

    /// Make writes to `id` report success without changing anything.
    pub fn swallow_writes(&mut self, id: SiteId) -> &mut Self {
        if let Some(slot) = self.state.borrow_mut().slot_mut(id) {
            slot.swallow_writes = true;
        }
        self
    }

    pub fn is_read_only(&self, id: SiteId) -> bool {
        self.state.borrow().slot(id).is_some_and(|s| s.read_only)
    }

    /// Current admin email of `id`, bypassing the context stack.
    pub fn email_of(&self, id: SiteId) -> Option<String> {
        self.state
            .borrow()
            .slot(id)
            .and_then(|s| s.options.get(ADMIN_EMAIL_OPTION).cloned())
    }

    /// Overwrite an option without counting it as a write.
    pub(crate) fn force_option(&self, id: SiteId, key: &str, value: &str) {
        if let Some(slot) = self.state.borrow_mut().slot_mut(id) {
            slot.options.insert(key.to_owned(), value.to_owned());
        }
    }

    /// All sites with their admin email, in registry order.
    pub(crate) fn entries(&self) -> Vec<(SiteId, String, String, bool)> {
        self.state
            .borrow()
            .sites
            .iter()
            .map(|s| {
                (
                    s.id,
                    s.url.clone(),
                    s.options.get(ADMIN_EMAIL_OPTION).cloned().unwrap_or_default(),
                    s.read_only,
                )
            })
            .collect()
    }

    pub(crate) fn current_site(&self) -> SiteId {
        self.state.borrow().current()
    }

    pub(crate) fn set_multisite(&self, multisite: bool) {
        self.state.borrow_mut().multisite = multisite;
    }

    /// Number of `update_option` calls, successful or not.
    pub fn write_calls(&self) -> usize {
        self.state.borrow().writes
    }

    /// Number of context switches performed so far.
    pub fn switch_count(&self) -> usize {
        self.state.borrow().switches
    }

    /// Switches not yet restored. Zero whenever no scope is alive.
    pub fn context_depth(&self) -> usize {
        self.state.borrow().stack.len()
    }
}

impl SiteRegistry for MemoryRegistry {
    fn is_multisite(&self) -> bool {
        self.state.borrow().multisite
    }

    fn main_site(&self) -> SiteId {
        self.state.borrow().main_site()
    }

    fn count_sites(&self) -> Result<usize, CoreError> {
        Ok(self.state.borrow().sites.len())
    }

    fn sites(&self, offset: usize, limit: usize) -> Result<Vec<SiteRecord>, CoreError> {
        Ok(self
            .state
            .borrow()
            .sites
            .iter()
            .skip(offset)
            .take(limit)
            .map(|s| SiteRecord {
                id: s.id,
                url: s.url.clone(),
            })
            .collect())
    }

    fn lookup_url(&self, url: &str) -> Result<Option<SiteId>, CoreError> {
        Ok(self
            .state
            .borrow()
            .sites
            .iter()
            .find(|s| s.url == url)
            .map(|s| s.id))
    }

    fn switch_to(&mut self, id: SiteId) -> Result<(), CoreError> {
        let mut state = self.state.borrow_mut();
        if state.slot(id).is_none() {
            return Err(CoreError::UnknownSite { id });
        }
        state.stack.push(id);
        state.switches += 1;
        Ok(())
    }

    fn restore(&mut self) {
        self.state.borrow_mut().stack.pop();
    }

    fn current_url(&self) -> Result<String, CoreError> {
        let state = self.state.borrow();
        let id = state.current();
        state
            .slot(id)
            .map(|s| s.url.clone())
            .ok_or(CoreError::UnknownSite { id })
    }

    fn get_option(&self, key: &str) -> Result<Option<String>, CoreError> {
        let state = self.state.borrow();
        let id = state.current();
        let slot = state.slot(id).ok_or(CoreError::UnknownSite { id })?;
        Ok(slot.options.get(key).cloned())
    }

    fn update_option(&mut self, key: &str, value: &str) -> bool {
        let mut state = self.state.borrow_mut();
        state.writes += 1;
        let id = state.current();
        let Some(slot) = state.slot_mut(id) else {
            return false;
        };
        if slot.read_only {
            warn!(site = %id, key, "write declined: site is read-only");
            return false;
        }
        if !slot.swallow_writes {
            slot.options.insert(key.to_owned(), value.to_owned());
        }
        info!(site = %id, key, "option updated");
        true
    }
}
