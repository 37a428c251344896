// ── Domain types ──
//
// Read/write projections of registry state. Nothing here is persisted by
// this crate; every value is fetched on demand and dropped after use.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::email::ValidEmail;

/// Name of the per-site option this tool manages.
pub const ADMIN_EMAIL_OPTION: &str = "admin_email";

// ── SiteId ──────────────────────────────────────────────────────────

/// Opaque registry identifier for a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(u64);

impl SiteId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Sites and pages ─────────────────────────────────────────────────

/// Index entry returned by the registry without a context switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteRecord {
    pub id: SiteId,
    pub url: String,
}

/// A site together with its current admin email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Site {
    #[serde(skip)]
    pub id: SiteId,
    pub url: String,
    pub admin_email: String,
}

/// A bounded window over the network, in registry order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub offset: usize,
    pub size: usize,
    pub total: usize,
    pub items: Vec<Site>,
}

impl Page {
    /// One-based index of the first item, as shown to operators.
    pub fn start(&self) -> usize {
        if self.items.is_empty() {
            self.offset
        } else {
            self.offset + 1
        }
    }

    /// One-based index of the last item.
    pub fn end(&self) -> usize {
        self.offset + self.items.len()
    }

    pub fn is_last(&self) -> bool {
        self.items.len() < self.size || self.end() >= self.total
    }
}

// ── Pending changes ─────────────────────────────────────────────────

/// Which sites a change applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The only site of a single-site install.
    ThisSite,
    /// One network site, addressed by URL.
    OneSite(String),
    /// Every site in the network.
    AllSites,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ThisSite => f.write_str("this site"),
            Self::OneSite(url) => f.write_str(url),
            Self::AllSites => f.write_str("all sites"),
        }
    }
}

/// A validated, not yet confirmed, change request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChange {
    pub new_email: ValidEmail,
    pub target: Target,
    pub dry_run: bool,
}

impl PendingChange {
    pub fn mode_label(&self) -> &'static str {
        if self.dry_run { "DRY RUN" } else { "LIVE" }
    }
}

// ── Outcomes ────────────────────────────────────────────────────────

/// Per-site write result kept by batch updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub url: String,
    pub succeeded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// Dry-run: nothing was written.
    Previewed,
    Written,
    /// The registry declined the write.
    Rejected,
}

/// Result of a single-target apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteChange {
    pub url: String,
    pub previous: String,
    pub requested: String,
    pub outcome: ChangeOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(offset: usize, size: usize, total: usize, len: usize) -> Page {
        let items = (0..len)
            .map(|i| Site {
                id: SiteId::new(i as u64 + 1),
                url: format!("https://s{i}.test/"),
                admin_email: String::new(),
            })
            .collect();
        Page {
            offset,
            size,
            total,
            items,
        }
    }

    #[test]
    fn page_bounds_are_one_based() {
        let p = page(10, 10, 25, 10);
        assert_eq!(p.start(), 11);
        assert_eq!(p.end(), 20);
        assert!(!p.is_last());
    }

    #[test]
    fn short_page_is_last() {
        let p = page(20, 10, 25, 5);
        assert!(p.is_last());
        assert_eq!(p.end(), 25);
    }

    #[test]
    fn empty_page_reports_offset_as_start() {
        let p = page(0, 10, 0, 0);
        assert_eq!(p.start(), 0);
        assert!(p.is_last());
    }

    #[test]
    fn target_display() {
        assert_eq!(Target::ThisSite.to_string(), "this site");
        assert_eq!(Target::AllSites.to_string(), "all sites");
        assert_eq!(
            Target::OneSite("https://a.test/".into()).to_string(),
            "https://a.test/"
        );
    }
}
