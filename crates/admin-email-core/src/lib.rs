// admin-email-core: registry access, validation, paging and updates for the
// `admin-email` CLI. No terminal I/O lives here.

pub mod batch;
pub mod email;
pub mod error;
pub mod help;
pub mod model;
pub mod paging;
pub mod registry;

// ── Primary re-exports ──────────────────────────────────────────────
pub use batch::{BatchEvent, BatchSummary, BatchUpdater, DEFAULT_BATCH_SIZE};
pub use email::{ValidEmail, validate};
pub use error::CoreError;
pub use help::{HelpDocument, build_toc, load_help};
pub use model::{
    ADMIN_EMAIL_OPTION, ChangeOutcome, Page, PendingChange, Site, SiteChange, SiteId, SiteRecord,
    Target, UpdateOutcome,
};
pub use paging::{PageSizes, PagerKey, PagerState};
pub use registry::{FileRegistry, MemoryRegistry, RegistryAdapter, SiteRegistry, SiteScope};
