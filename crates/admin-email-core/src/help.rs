// ── Help document ──
//
// Loads the bundled README and prepends a table of contents built from its
// Markdown headings. The result is a flat line list for the pager.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// File names looked up next to the executable, in order.
pub const HELP_FILE_NAMES: [&str; 2] = ["README.md", "readme.md"];

const SEPARATOR_WIDTH: usize = 60;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+?)\s*$").expect("heading pattern is valid"));

/// A README split into lines, plus its headings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpDocument {
    pub path: PathBuf,
    pub lines: Vec<String>,
    /// `(level, title)` per heading, level 1..=6.
    pub toc: Vec<(usize, String)>,
}

impl HelpDocument {
    pub fn from_text(path: impl Into<PathBuf>, raw: &str) -> Self {
        let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");
        let lines: Vec<String> = normalized.split('\n').map(str::to_owned).collect();
        let toc = headings(&lines);
        Self {
            path: path.into(),
            lines,
            toc,
        }
    }

    /// TOC rendered as indented bullet lines.
    pub fn toc_lines(&self) -> Vec<String> {
        self.toc
            .iter()
            .map(|(level, title)| toc_entry(*level, title))
            .collect()
    }

    /// Header, TOC and raw body, ready for paging.
    pub fn pager_lines(&self) -> Vec<String> {
        let separator = "-".repeat(SEPARATOR_WIDTH);
        let file_name = self
            .path
            .file_name()
            .map_or_else(|| HELP_FILE_NAMES[0].to_owned(), |n| n.to_string_lossy().into_owned());

        let mut out = vec![
            format!("HELP: admin-email ({file_name})"),
            format!("File: {}", self.path.display()),
            separator.clone(),
            "TABLE OF CONTENTS".to_owned(),
            separator.clone(),
        ];
        let toc = self.toc_lines();
        if toc.is_empty() {
            out.push("(No headings found.)".to_owned());
        } else {
            out.extend(toc);
        }
        out.push(String::new());
        out.push(separator.clone());
        out.push("README".to_owned());
        out.push(separator);
        out.extend(self.lines.iter().cloned());
        out
    }
}

/// Markdown headings of `lines`, in document order.
pub fn headings<S: AsRef<str>>(lines: &[S]) -> Vec<(usize, String)> {
    lines
        .iter()
        .filter_map(|line| {
            let caps = HEADING.captures(line.as_ref())?;
            let level = caps.get(1)?.as_str().len();
            let title = caps.get(2)?.as_str().trim().to_owned();
            Some((level, title))
        })
        .collect()
}

/// Indented TOC lines for `lines`.
pub fn build_toc<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    headings(lines)
        .iter()
        .map(|(level, title)| toc_entry(*level, title))
        .collect()
}

fn toc_entry(level: usize, title: &str) -> String {
    format!("{}- {title}", "  ".repeat(level.saturating_sub(1)))
}

/// Load the first readable candidate. `None` when none can be read.
pub fn load_help<P: AsRef<Path>>(candidates: &[P]) -> Option<HelpDocument> {
    candidates.iter().find_map(|candidate| {
        let path = candidate.as_ref();
        if !path.is_file() {
            return None;
        }
        match std::fs::read_to_string(path) {
            Ok(raw) => Some(HelpDocument::from_text(path, &raw)),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "help candidate unreadable");
                None
            }
        }
    })
}

/// Default candidates: the README variants next to the running executable.
pub fn default_candidates() -> Vec<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .map(|dir| HELP_FILE_NAMES.iter().map(|name| dir.join(name)).collect())
        .unwrap_or_default()
}
