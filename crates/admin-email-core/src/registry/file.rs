// ── TOML-backed registry ──
//
// A network described in a TOML file. Reads are served from memory; every
// accepted write is persisted before it is reported as successful.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{SiteId, SiteRecord};

use super::{MemoryRegistry, SiteRegistry};

/// On-disk layout of a network file.
///
/// ```toml
/// multisite = true
///
/// [[sites]]
/// id = 1
/// url = "https://example.com/"
/// admin_email = "ops@example.com"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkFile {
    #[serde(default)]
    pub multisite: bool,
    #[serde(default)]
    pub sites: Vec<SiteEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteEntry {
    pub id: SiteId,
    pub url: String,
    #[serde(default)]
    pub admin_email: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
}

/// A [`SiteRegistry`] persisted to a TOML [`NetworkFile`].
#[derive(Debug)]
pub struct FileRegistry {
    path: PathBuf,
    memory: MemoryRegistry,
}

impl FileRegistry {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        let raw = std::fs::read_to_string(&path).map_err(|source| CoreError::Io {
            path: path.clone(),
            source,
        })?;
        let network: NetworkFile = toml::from_str(&raw).map_err(|source| CoreError::Parse {
            path: path.clone(),
            source,
        })?;
        Self::from_network(path, &network)
    }

    fn from_network(path: PathBuf, network: &NetworkFile) -> Result<Self, CoreError> {
        if network.sites.is_empty() && !network.multisite {
            return Err(CoreError::Registry {
                message: format!("{} describes no site", path.display()),
            });
        }

        let mut seen = HashSet::new();
        let mut memory = if network.multisite {
            MemoryRegistry::multisite()
        } else {
            MemoryRegistry::default()
        };
        for entry in &network.sites {
            if !seen.insert(entry.id) {
                return Err(CoreError::Registry {
                    message: format!("duplicate site id {} in {}", entry.id, path.display()),
                });
            }
            memory
                .add_site(entry.id, entry.url.clone(), entry.admin_email.clone())
                .set_read_only(entry.id, entry.read_only);
        }
        memory.set_multisite(network.multisite);

        debug!(path = %path.display(), sites = network.sites.len(), "loaded network file");
        Ok(Self { path, memory })
    }

    fn snapshot(&self) -> NetworkFile {
        NetworkFile {
            multisite: self.memory.is_multisite(),
            sites: self
                .memory
                .entries()
                .into_iter()
                .map(|(id, url, admin_email, read_only)| SiteEntry {
                    id,
                    url,
                    admin_email,
                    read_only,
                })
                .collect(),
        }
    }

    fn persist(&self) -> Result<(), CoreError> {
        let body = toml::to_string_pretty(&self.snapshot())?;
        std::fs::write(&self.path, body).map_err(|source| CoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl SiteRegistry for FileRegistry {
    fn is_multisite(&self) -> bool {
        self.memory.is_multisite()
    }

    fn main_site(&self) -> SiteId {
        self.memory.main_site()
    }

    fn count_sites(&self) -> Result<usize, CoreError> {
        self.memory.count_sites()
    }

    fn sites(&self, offset: usize, limit: usize) -> Result<Vec<SiteRecord>, CoreError> {
        self.memory.sites(offset, limit)
    }

    fn lookup_url(&self, url: &str) -> Result<Option<SiteId>, CoreError> {
        self.memory.lookup_url(url)
    }

    fn switch_to(&mut self, id: SiteId) -> Result<(), CoreError> {
        self.memory.switch_to(id)
    }

    fn restore(&mut self) {
        self.memory.restore();
    }

    fn current_url(&self) -> Result<String, CoreError> {
        self.memory.current_url()
    }

    fn get_option(&self, key: &str) -> Result<Option<String>, CoreError> {
        self.memory.get_option(key)
    }

    fn update_option(&mut self, key: &str, value: &str) -> bool {
        let Ok(previous) = self.memory.get_option(key) else {
            return false;
        };
        if !self.memory.update_option(key, value) {
            return false;
        }
        match self.persist() {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "could not persist network file, rolling back");
                let id = self.memory.current_site();
                self.memory
                    .force_option(id, key, previous.as_deref().unwrap_or_default());
                false
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::ADMIN_EMAIL_OPTION;

    const NETWORK: &str = r#"
multisite = true

[[sites]]
id = 1
url = "https://example.test/"
admin_email = "root@example.test"

[[sites]]
id = 2
url = "https://example.test/blog/"
admin_email = "blog@example.test"
read_only = true
"#;

    fn write_network(body: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("network.toml");
        std::fs::write(&path, body).unwrap();
        (dir, path)
    }

    #[test]
    fn loads_sites_in_file_order() {
        let (_dir, path) = write_network(NETWORK);
        let reg = FileRegistry::open(&path).unwrap();
        assert!(reg.is_multisite());
        let urls: Vec<String> = reg.sites(0, 10).unwrap().into_iter().map(|r| r.url).collect();
        assert_eq!(urls, ["https://example.test/", "https://example.test/blog/"]);
    }

    #[test]
    fn accepted_write_is_persisted() {
        let (_dir, path) = write_network(NETWORK);
        let mut reg = FileRegistry::open(&path).unwrap();
        reg.switch_to(SiteId::new(1)).unwrap();
        assert!(reg.update_option(ADMIN_EMAIL_OPTION, "new@example.test"));
        reg.restore();

        let reloaded = FileRegistry::open(&path).unwrap();
        assert_eq!(
            reloaded.memory.email_of(SiteId::new(1)).as_deref(),
            Some("new@example.test")
        );
        assert!(reloaded.memory.is_read_only(SiteId::new(2)));
    }

    #[test]
    fn read_only_entry_declines_write() {
        let (_dir, path) = write_network(NETWORK);
        let mut reg = FileRegistry::open(&path).unwrap();
        reg.switch_to(SiteId::new(2)).unwrap();
        assert!(!reg.update_option(ADMIN_EMAIL_OPTION, "x@example.test"));
        reg.restore();
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let (_dir, path) = write_network(
            "[[sites]]\nid = 1\nurl = \"https://a.test/\"\n\n[[sites]]\nid = 1\nurl = \"https://b.test/\"\n",
        );
        let err = FileRegistry::open(&path).unwrap_err();
        assert!(err.to_string().contains("duplicate site id 1"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = FileRegistry::open("/nonexistent/network.toml").unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let (_dir, path) = write_network("sites = 3");
        assert!(matches!(
            FileRegistry::open(&path).unwrap_err(),
            CoreError::Parse { .. }
        ));
    }
}
