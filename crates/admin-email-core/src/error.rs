// ── Core error types ──
//
// Errors raised by the registry adapter, validator and updaters. The CLI
// maps these onto user-facing diagnostics and exit codes.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::SiteId;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Resolution errors ────────────────────────────────────────────
    #[error("Could not find site for URL: {url}")]
    SiteNotFound { url: String },

    #[error("Unknown site id {id}")]
    UnknownSite { id: SiteId },

    // ── Input errors ─────────────────────────────────────────────────
    #[error("Invalid email '{input}': {reason}")]
    InvalidEmail { input: String, reason: String },

    // ── Registry errors ──────────────────────────────────────────────
    #[error("Site registry error: {message}")]
    Registry { message: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize registry: {0}")]
    Serialize(#[from] toml::ser::Error),
}
