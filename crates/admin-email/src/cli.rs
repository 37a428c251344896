//! Clap derive structures for the `admin-email` CLI.
//!
//! Defines the command tree, global flags, and shared value enums. This file
//! is also compiled by `build.rs`, so it may only depend on `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// admin-email -- view and update the admin email of one site or a whole network
#[derive(Debug, Parser)]
#[command(
    name = "admin-email",
    version,
    about = "View and update site admin emails",
    long_about = "View and update the admin email of a single site or of every site\n\
        in a multisite network.\n\n\
        Run without a subcommand for the interactive browser, or use `set` and\n\
        `get` from scripts.",
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Option<Command>,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Network file describing the site registry
    #[arg(long, short = 'r', env = "ADMIN_EMAIL_REGISTRY", global = true)]
    pub registry: Option<PathBuf>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, env = "ADMIN_EMAIL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Show what would change, but do not write changes
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Comma-separated values with a header row
    Csv,
    /// YAML
    Yaml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the admin email without prompting
    ///
    /// On a multisite network exactly one of --network or --url is required.
    #[command(after_help = "Examples:\n  \
        admin-email set user@example.com\n  \
        admin-email set user@example.com --network\n  \
        admin-email set user@example.com --url=https://example.com/subsite/\n  \
        admin-email set user@example.com --dry-run")]
    Set(SetArgs),

    /// Print the current admin email(s)
    Get(GetArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// New admin email address
    pub email: String,

    /// Apply to all sites in a multisite network
    #[arg(long)]
    pub network: bool,

    /// Apply only to the site with this URL (multisite)
    #[arg(long, value_name = "SITEURL")]
    pub url: Option<String>,
}

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Only show the site with this URL (multisite)
    #[arg(long, value_name = "SITEURL", conflicts_with = "network")]
    pub url: Option<String>,

    /// Show every site in the network (the default on multisite)
    #[arg(long)]
    pub network: bool,

    /// Output format
    #[arg(long, short = 'f', default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
