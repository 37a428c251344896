//! Terminal prompt and output primitives.
//!
//! Commands talk to a [`Terminal`] instead of stdin/stdout directly so the
//! interactive flows can be driven by a script in tests.

use std::io::{self, BufRead, IsTerminal, Write};

use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

use crate::cli::ColorMode;
use crate::error::CliError;

/// Line-oriented prompt/output surface.
pub trait Terminal {
    /// Read one line of input. Blank input is allowed.
    fn prompt(&mut self, message: &str) -> Result<String, CliError>;

    /// Ask a yes/no question. Defaults to no.
    fn confirm(&mut self, message: &str) -> Result<bool, CliError>;

    /// Informational output.
    fn line(&mut self, text: &str);

    /// Output the operator must see before answering a prompt. Never
    /// silenced by `-q`.
    fn notice(&mut self, text: &str);

    fn warning(&mut self, text: &str);

    fn success(&mut self, text: &str);

    /// Start a progress indicator over `total` steps.
    fn progress(&mut self, total: u64) -> Box<dyn Progress>;
}

pub trait Progress {
    fn inc(&mut self);

    /// Print a line without corrupting the bar.
    fn println(&mut self, text: &str);

    fn finish(&mut self);
}

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Prompt(e.to_string())
}

// ── Console ──────────────────────────────────────────────────────────

/// The real terminal. Uses dialoguer on a TTY and plain line reads when
/// stdin is piped.
pub struct ConsoleTerminal {
    color: bool,
    quiet: bool,
    interactive: bool,
}

impl ConsoleTerminal {
    pub fn new(color: ColorMode, quiet: bool) -> Self {
        Self {
            color: should_color(color),
            quiet,
            interactive: io::stdin().is_terminal() && io::stderr().is_terminal(),
        }
    }

    fn read_piped(message: &str) -> Result<String, CliError> {
        let mut stderr = io::stderr().lock();
        write!(stderr, "{message}: ")?;
        stderr.flush()?;

        let mut buf = String::new();
        if io::stdin().lock().read_line(&mut buf)? == 0 {
            return Err(CliError::Prompt("end of input".into()));
        }
        Ok(buf.trim_end_matches(['\r', '\n']).to_owned())
    }
}

impl Terminal for ConsoleTerminal {
    fn prompt(&mut self, message: &str) -> Result<String, CliError> {
        if !self.interactive {
            return Self::read_piped(message);
        }
        Input::<String>::new()
            .with_prompt(message)
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_err)
    }

    fn confirm(&mut self, message: &str) -> Result<bool, CliError> {
        if !self.interactive {
            let answer = Self::read_piped(&format!("{message} [y/N]"))?;
            return Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"));
        }
        Confirm::new()
            .with_prompt(message)
            .default(false)
            .interact()
            .map_err(prompt_err)
    }

    fn line(&mut self, text: &str) {
        if !self.quiet {
            println!("{text}");
        }
    }

    fn notice(&mut self, text: &str) {
        if self.quiet {
            eprintln!("{text}");
        } else {
            println!("{text}");
        }
    }

    fn warning(&mut self, text: &str) {
        if self.color {
            eprintln!("{} {text}", "Warning:".yellow().bold());
        } else {
            eprintln!("Warning: {text}");
        }
    }

    fn success(&mut self, text: &str) {
        if self.quiet {
            return;
        }
        if self.color {
            println!("{} {text}", "Success:".green().bold());
        } else {
            println!("Success: {text}");
        }
    }

    fn progress(&mut self, total: u64) -> Box<dyn Progress> {
        let bar = if self.quiet || !io::stderr().is_terminal() {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(total);
            if let Ok(style) =
                ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} sites {msg}")
            {
                bar.set_style(style);
            }
            bar
        };
        Box::new(BarProgress { bar })
    }
}

struct BarProgress {
    bar: ProgressBar,
}

impl Progress for BarProgress {
    fn inc(&mut self) {
        self.bar.inc(1);
    }

    fn println(&mut self, text: &str) {
        if self.bar.is_hidden() {
            println!("{text}");
        } else {
            self.bar.println(text);
        }
    }

    fn finish(&mut self) {
        self.bar.finish_and_clear();
    }
}

// ── Scripted terminal (tests) ────────────────────────────────────────
