//! Output formatting: table, JSON, CSV, YAML.
//!
//! Table uses `tabled`, structured formats serialize the row views via serde.

use std::io::{self, Write};

use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use admin_email_core::Site;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Column layout for site rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Columns {
    /// `admin_email` only (single-site installs).
    Email,
    /// `url`, `admin_email`.
    UrlAndEmail,
}

impl Columns {
    fn headers(self) -> &'static [&'static str] {
        match self {
            Self::Email => &["admin_email"],
            Self::UrlAndEmail => &["url", "admin_email"],
        }
    }
}

/// Serializable view of a site, shaped by [`Columns`].
#[derive(Debug, Serialize)]
struct SiteView<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    admin_email: &'a str,
}

impl<'a> SiteView<'a> {
    fn new(site: &'a Site, columns: Columns) -> Self {
        Self {
            url: (columns == Columns::UrlAndEmail).then_some(site.url.as_str()),
            admin_email: &site.admin_email,
        }
    }

    fn cells(&self) -> Vec<String> {
        self.url
            .into_iter()
            .chain(std::iter::once(self.admin_email))
            .map(str::to_owned)
            .collect()
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render sites in the chosen format.
pub fn render_sites(
    format: OutputFormat,
    sites: &[Site],
    columns: Columns,
) -> Result<String, CliError> {
    let views: Vec<SiteView<'_>> = sites.iter().map(|s| SiteView::new(s, columns)).collect();
    match format {
        OutputFormat::Table => {
            let rows: Vec<Vec<String>> = views.iter().map(SiteView::cells).collect();
            Ok(render_table(columns.headers(), &rows))
        }
        OutputFormat::Json => {
            serde_json::to_string_pretty(&views).map_err(|e| CliError::Output(e.to_string()))
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(&views).map_err(|e| CliError::Output(e.to_string()))
        }
        OutputFormat::Csv => render_csv(columns.headers(), &views),
    }
}

/// Format `rows` under `columns` as a rounded table.
pub fn render_table<S: AsRef<str>>(columns: &[&str], rows: &[Vec<S>]) -> String {
    let mut builder = Builder::default();
    builder.push_record(columns.iter().copied());
    for row in rows {
        builder.push_record(row.iter().map(AsRef::as_ref));
    }
    builder.build().with(Style::rounded()).to_string()
}

fn render_csv(headers: &[&str], views: &[SiteView<'_>]) -> Result<String, CliError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(headers)
        .map_err(|e| CliError::Output(e.to_string()))?;
    for view in views {
        wtr.write_record(view.cells())
            .map_err(|e| CliError::Output(e.to_string()))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| CliError::Output(e.to_string()))?;
    let text = String::from_utf8(bytes).map_err(|e| CliError::Output(e.to_string()))?;
    Ok(text.trim_end().to_owned())
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}
