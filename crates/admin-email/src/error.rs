//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use admin_email_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const WRITE_DECLINED: i32 = 5;
    pub const CONFIG: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Resolution ───────────────────────────────────────────────────

    #[error("Could not find site for URL: {url}")]
    #[diagnostic(
        code(admin_email::not_found),
        help("Run: admin-email get --network to see the registered site URLs")
    )]
    SiteNotFound { url: String },

    // ── Writes ───────────────────────────────────────────────────────

    #[error("The registry declined to update admin_email for {url}")]
    #[diagnostic(
        code(admin_email::write_declined),
        help("Check that the site is writable. Nothing was changed.")
    )]
    WriteDeclined { url: String },

    // ── Input ────────────────────────────────────────────────────────

    #[error("Email is required.")]
    #[diagnostic(code(admin_email::email_required))]
    EmailRequired,

    #[error("Invalid email '{input}': {reason}")]
    #[diagnostic(code(admin_email::invalid_email))]
    InvalidEmail { input: String, reason: String },

    #[error("On multisite, specify --network or --url=<siteurl>.")]
    #[diagnostic(
        code(admin_email::usage),
        help("Use --network to update every site, or --url to update one site, but not both.")
    )]
    AmbiguousScope,

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Aborted.")]
    #[diagnostic(code(admin_email::aborted))]
    Aborted,

    #[error("Prompt failed: {0}")]
    #[diagnostic(code(admin_email::prompt))]
    Prompt(String),

    // ── Configuration ────────────────────────────────────────────────

    #[error("No site registry configured")]
    #[diagnostic(
        code(admin_email::no_registry),
        help(
            "Pass --registry <PATH>, set ADMIN_EMAIL_REGISTRY, or add\n\
             `registry = \"/path/to/network.toml\"` to {path}"
        )
    )]
    NoRegistry { path: String },

    #[error(transparent)]
    #[diagnostic(code(admin_email::config))]
    Config(Box<figment::Error>),

    #[error("Site registry error: {message}")]
    #[diagnostic(code(admin_email::registry))]
    Registry { message: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(admin_email::output))]
    Output(String),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SiteNotFound { .. } => exit_code::NOT_FOUND,
            Self::WriteDeclined { .. } => exit_code::WRITE_DECLINED,
            Self::EmailRequired | Self::InvalidEmail { .. } | Self::AmbiguousScope => {
                exit_code::USAGE
            }
            Self::NoRegistry { .. } | Self::Config(_) | Self::Registry { .. } => exit_code::CONFIG,
            Self::Aborted | Self::Prompt(_) | Self::Io(_) | Self::Output(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SiteNotFound { url } => CliError::SiteNotFound { url },
            CoreError::InvalidEmail { input, reason } => CliError::InvalidEmail { input, reason },
            CoreError::UnknownSite { .. }
            | CoreError::Registry { .. }
            | CoreError::Io { .. }
            | CoreError::Parse { .. }
            | CoreError::Serialize(_) => CliError::Registry {
                message: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_failures_exit_not_found() {
        let err = CliError::from(CoreError::SiteNotFound {
            url: "https://x.test/".into(),
        });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        assert_eq!(err.to_string(), "Could not find site for URL: https://x.test/");
    }

    #[test]
    fn abort_is_a_general_failure() {
        assert_eq!(CliError::Aborted.exit_code(), exit_code::GENERAL);
        assert_ne!(CliError::Aborted.exit_code(), exit_code::SUCCESS);
    }

    #[test]
    fn usage_errors_exit_two() {
        assert_eq!(CliError::AmbiguousScope.exit_code(), exit_code::USAGE);
        assert_eq!(CliError::EmailRequired.exit_code(), exit_code::USAGE);
    }
}
