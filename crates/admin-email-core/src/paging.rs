// ── Paging ──
//
// Page sizing from terminal height and the navigation state of the line
// pager. Rendering and key input live in the CLI.

use std::ops::Range;

/// Height assumed when the terminal does not report one.
pub const DEFAULT_TERMINAL_HEIGHT: usize = 24;

const LISTING_RESERVE: usize = 8;
const MIN_PAGE: usize = 10;
const MAX_PAGE: usize = 50;
const HELP_FOOTER_RESERVE: usize = 2;
const MIN_HELP_PAGE: usize = 8;

/// Parse a reported terminal height, falling back to 24 rows.
pub fn terminal_height(reported: Option<&str>) -> usize {
    reported
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|&h| h > 0)
        .unwrap_or(DEFAULT_TERMINAL_HEIGHT)
}

/// Rows per listing page for a terminal of `height` rows.
pub fn page_size(height: usize) -> usize {
    height.saturating_sub(LISTING_RESERVE).clamp(MIN_PAGE, MAX_PAGE)
}

/// Rows per help page, leaving room for the pager footer.
pub fn help_page_size(page_size: usize) -> usize {
    page_size.saturating_sub(HELP_FOOTER_RESERVE).max(MIN_HELP_PAGE)
}

/// Listing and help page sizes resolved once per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSizes {
    pub listing: usize,
    pub help: usize,
}

impl PageSizes {
    pub fn for_height(height: usize) -> Self {
        Self::fixed(page_size(height))
    }

    /// Use `listing` as-is; the help size is still derived from it.
    pub fn fixed(listing: usize) -> Self {
        let listing = listing.max(1);
        Self {
            listing,
            help: help_page_size(listing),
        }
    }

    /// Derive sizes from the `LINES` environment variable.
    pub fn from_env() -> Self {
        let lines = std::env::var("LINES").ok();
        Self::for_height(terminal_height(lines.as_deref()))
    }
}

// ── Pager state ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerKey {
    Next,
    Back,
    Quit,
}

/// Position of the line pager within a fixed-length document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagerState {
    offset: usize,
    page_size: usize,
    total: usize,
}

impl PagerState {
    pub fn new(total: usize, page_size: usize) -> Self {
        Self {
            offset: 0,
            page_size: page_size.max(1),
            total,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Indices of the lines on the current page.
    pub fn visible(&self) -> Range<usize> {
        self.offset..self.end()
    }

    fn end(&self) -> usize {
        (self.offset + self.page_size).min(self.total)
    }

    pub fn at_last_page(&self) -> bool {
        self.end() >= self.total
    }

    pub fn footer(&self) -> String {
        format!("Lines {}–{} of {}", self.offset + 1, self.end(), self.total)
    }

    pub fn prompt(&self) -> &'static str {
        if self.at_last_page() {
            "[Q] quit, [B] back"
        } else {
            "[Enter] next, [B] back, [Q] quit"
        }
    }

    /// Interpret a raw answer to [`prompt`](Self::prompt).
    ///
    /// On the last page anything but `b` quits; elsewhere anything but
    /// `q` or `b` advances.
    pub fn key_for(&self, input: &str) -> PagerKey {
        let input = input.trim().to_ascii_lowercase();
        match input.as_str() {
            "b" => PagerKey::Back,
            "q" => PagerKey::Quit,
            _ if self.at_last_page() => PagerKey::Quit,
            _ => PagerKey::Next,
        }
    }

    /// Apply a key. Returns `false` once the pager should close.
    pub fn apply(&mut self, key: PagerKey) -> bool {
        match key {
            PagerKey::Quit => false,
            PagerKey::Back => {
                self.offset = self.offset.saturating_sub(self.page_size);
                true
            }
            PagerKey::Next => {
                self.offset = (self.offset + self.page_size).min(self.total);
                true
            }
        }
    }
}
