//! The interactive session: list, set, refresh, help, quit.

use tracing::{debug, info};

use admin_email_core::{PendingChange, RegistryAdapter, Target, ValidEmail, validate};

use super::util::{ListingMode, apply_change, confirm_or_abort, render_current, show_help};
use crate::config::Settings;
use crate::error::CliError;
use crate::terminal::Terminal;

pub const MENU_PROMPT: &str = "Options: [S]et email, [R]efresh, [H]elp, [Q]uit";
pub const EMAIL_PROMPT: &str = "New admin email";
pub const SCOPE_PROMPT: &str = "Optional site URL (blank = ALL sites)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Render the current admin email(s).
    Listing,
    AwaitingChoice,
    PromptingEmail,
    /// Multisite only: ask which site the validated email applies to.
    PromptingScope { email: ValidEmail },
    Confirming(PendingChange),
    Applying(PendingChange),
    Help,
    Quit,
}

pub struct Session<'a> {
    adapter: &'a mut RegistryAdapter,
    term: &'a mut dyn Terminal,
    settings: &'a Settings,
    multisite: bool,
}

impl<'a> Session<'a> {
    pub fn new(
        adapter: &'a mut RegistryAdapter,
        term: &'a mut dyn Terminal,
        settings: &'a Settings,
    ) -> Self {
        let multisite = adapter.is_multisite();
        Self {
            adapter,
            term,
            settings,
            multisite,
        }
    }

    /// Drive the session until the operator quits or a fatal error occurs.
    pub fn run(mut self) -> Result<(), CliError> {
        if self.multisite {
            self.term.line("Detected multisite network.");
        }
        info!(multisite = self.multisite, dry_run = self.settings.dry_run, "interactive session");

        let mut state = SessionState::Listing;
        while state != SessionState::Quit {
            state = self.step(state)?;
        }
        Ok(())
    }

    /// Perform one transition.
    pub fn step(&mut self, state: SessionState) -> Result<SessionState, CliError> {
        debug!(?state, "session step");
        match state {
            SessionState::Listing => {
                render_current(
                    self.adapter,
                    self.term,
                    ListingMode::Paged(self.settings.pages.listing),
                )?;
                Ok(SessionState::AwaitingChoice)
            }
            SessionState::AwaitingChoice => {
                let choice = self.term.prompt(MENU_PROMPT)?;
                Ok(self.choose(&choice))
            }
            SessionState::PromptingEmail => Ok(self.read_email()?),
            SessionState::PromptingScope { email } => {
                let url = self.term.prompt(SCOPE_PROMPT)?;
                let url = url.trim();
                let target = if url.is_empty() {
                    Target::AllSites
                } else {
                    Target::OneSite(url.to_owned())
                };
                Ok(SessionState::Confirming(self.pending(email, target)))
            }
            SessionState::Confirming(change) => {
                confirm_or_abort(self.term, &change)?;
                Ok(SessionState::Applying(change))
            }
            SessionState::Applying(change) => {
                apply_change(self.adapter, self.term, self.settings, &change)?;
                Ok(SessionState::Listing)
            }
            SessionState::Help => {
                show_help(self.term, self.settings)?;
                Ok(SessionState::Listing)
            }
            SessionState::Quit => Ok(SessionState::Quit),
        }
    }

    fn choose(&mut self, input: &str) -> SessionState {
        let key = input.trim().to_ascii_lowercase();
        match key.as_str() {
            "q" => SessionState::Quit,
            "r" => SessionState::Listing,
            "h" => SessionState::Help,
            "s" => SessionState::PromptingEmail,
            "" => SessionState::AwaitingChoice,
            _ => {
                self.term.warning(&format!("Unknown option '{}'.", input.trim()));
                SessionState::AwaitingChoice
            }
        }
    }

    fn read_email(&mut self) -> Result<SessionState, CliError> {
        let raw = self.term.prompt(EMAIL_PROMPT)?;
        let raw = raw.trim();
        if raw.is_empty() {
            self.term.warning("Email cannot be blank.");
            return Ok(SessionState::AwaitingChoice);
        }

        match validate(raw) {
            Err(err) => {
                self.term.warning(&err.to_string());
                Ok(SessionState::AwaitingChoice)
            }
            Ok(email) if self.multisite => Ok(SessionState::PromptingScope { email }),
            Ok(email) => Ok(SessionState::Confirming(
                self.pending(email, Target::ThisSite),
            )),
        }
    }

    fn pending(&self, new_email: ValidEmail, target: Target) -> PendingChange {
        PendingChange {
            new_email,
            target,
            dry_run: self.settings.dry_run,
        }
    }
}

/// Run the interactive session.
pub fn run(
    adapter: &mut RegistryAdapter,
    term: &mut dyn Terminal,
    settings: &Settings,
) -> Result<(), CliError> {
    Session::new(adapter, term, settings).run()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use admin_email_core::{MemoryRegistry, SiteId};

    use super::*;
    use crate::commands::util::tests::{network, settings};
    use crate::terminal::testing::ScriptedTerminal;

    fn solo() -> MemoryRegistry {
        MemoryRegistry::single_site("https://solo.test/", "me@solo.test")
    }

    fn dry(mut settings: Settings) -> Settings {
        settings.dry_run = true;
        settings
    }

    #[test]
    fn quit_right_away() {
        let backing = network(2);
        let mut adapter = RegistryAdapter::new(backing.clone());
        let mut term = ScriptedTerminal::new(["q"]);

        run(&mut adapter, &mut term, &settings(10, None)).unwrap();

        assert_eq!(term.transcript()[0], "Detected multisite network.");
        assert!(term.contains("https://net.test/s2/"));
        assert_eq!(term.prompts, vec![MENU_PROMPT]);
        assert_eq!(backing.write_calls(), 0);
    }

    #[test]
    fn single_site_set_writes_and_redisplays() {
        let backing = solo();
        let mut adapter = RegistryAdapter::new(backing.clone());
        let mut term = ScriptedTerminal::new(["s", "you@solo.test", "y", "q"]);

        run(&mut adapter, &mut term, &settings(10, None)).unwrap();

        assert!(!term.contains("Detected multisite network."));
        assert!(term.contains("Target: this site"));
        assert!(term.contains("Success: Updated admin_email to you@solo.test."));
        assert_eq!(backing.email_of(SiteId::new(1)).as_deref(), Some("you@solo.test"));
        // The table after the write shows the stored value.
        let last_table = term
            .transcript()
            .into_iter()
            .rev()
            .find(|l| l.contains("admin_email"))
            .unwrap();
        assert!(last_table.contains("you@solo.test"));
    }

    #[test]
    fn redisplay_reflects_registry_not_request() {
        let mut backing = solo();
        backing.swallow_writes(SiteId::new(1));
        let mut adapter = RegistryAdapter::new(backing.clone());
        let mut term = ScriptedTerminal::new(["s", "you@solo.test", "y", "q"]);

        run(&mut adapter, &mut term, &settings(10, None)).unwrap();

        let tables: Vec<String> = term
            .transcript()
            .into_iter()
            .filter(|l| l.contains("╭"))
            .collect();
        assert_eq!(tables.len(), 2);
        assert!(tables[1].contains("me@solo.test"));
        assert!(!tables[1].contains("you@solo.test"));
    }

    #[test]
    fn decline_aborts_without_writing() {
        let backing = network(3);
        let mut adapter = RegistryAdapter::new(backing.clone());
        let mut term = ScriptedTerminal::new(["s", "new@net.test", "", "n"]);

        let err = run(&mut adapter, &mut term, &settings(10, None)).unwrap_err();

        assert!(matches!(err, CliError::Aborted));
        assert_eq!(backing.write_calls(), 0);
        assert_eq!(backing.context_depth(), 0);
    }

    #[test]
    fn decline_aborts_in_dry_run() {
        let backing = network(3);
        let mut adapter = RegistryAdapter::new(backing.clone());
        let mut term = ScriptedTerminal::new(["s", "new@net.test", "", "n"]);

        let err = run(&mut adapter, &mut term, &dry(settings(10, None))).unwrap_err();

        assert!(matches!(err, CliError::Aborted));
        assert!(term.contains("Mode: DRY RUN"));
        assert!(!term.contains("[DRY RUN] https://"));
        assert_eq!(backing.write_calls(), 0);
    }

    #[test]
    fn dry_run_network_update_writes_nothing() {
        let backing = network(3);
        let mut adapter = RegistryAdapter::new(backing.clone());
        let mut term = ScriptedTerminal::new(["s", "new@net.test", "", "y", "q"]);

        run(&mut adapter, &mut term, &dry(settings(10, None))).unwrap();

        assert!(term.contains("Mode: DRY RUN"));
        assert!(term.contains("[DRY RUN] 3 site(s) would be updated."));
        assert_eq!(backing.write_calls(), 0);
    }

    #[test]
    fn one_site_update_targets_only_that_site() {
        let backing = network(3);
        let mut adapter = RegistryAdapter::new(backing.clone());
        let mut term =
            ScriptedTerminal::new(["S", "new@net.test", "https://net.test/s2/", "y", "q"]);

        run(&mut adapter, &mut term, &settings(10, None)).unwrap();

        assert!(term.contains("Target: https://net.test/s2/"));
        assert!(term.contains("Success: Updated https://net.test/s2/ to new@net.test"));
        assert_eq!(backing.email_of(SiteId::new(2)).as_deref(), Some("new@net.test"));
        assert_eq!(backing.email_of(SiteId::new(1)).as_deref(), Some("old1@net.test"));
    }

    #[test]
    fn unknown_site_url_is_fatal() {
        let backing = network(2);
        let mut adapter = RegistryAdapter::new(backing.clone());
        let mut term =
            ScriptedTerminal::new(["s", "new@net.test", "https://other.test/", "y"]);

        let err = run(&mut adapter, &mut term, &settings(10, None)).unwrap_err();

        assert!(matches!(err, CliError::SiteNotFound { .. }));
        assert_eq!(backing.write_calls(), 0);
    }

    #[test]
    fn bad_input_warns_and_continues() {
        let backing = solo();
        let mut adapter = RegistryAdapter::new(backing.clone());
        let mut term = ScriptedTerminal::new(["s", "   ", "s", "nodomain", "x", "", "q"]);

        run(&mut adapter, &mut term, &settings(10, None)).unwrap();

        assert!(term.contains("Warning: Email cannot be blank."));
        assert!(term.contains("Warning: Invalid email 'nodomain'"));
        assert!(term.contains("Warning: Unknown option 'x'."));
        assert_eq!(term.count("Warning:"), 3);
        assert_eq!(term.remaining(), 0);
        assert_eq!(backing.write_calls(), 0);
    }

    #[test]
    fn help_rerenders_listing() {
        let mut adapter = RegistryAdapter::new(solo());
        let mut term = ScriptedTerminal::new(["h", "q"]);
        let settings = settings(10, Some(PathBuf::from("/nonexistent/README.md")));

        run(&mut adapter, &mut term, &settings).unwrap();

        assert!(term.contains("Warning: README.md not found or not readable."));
        assert_eq!(term.count("me@solo.test"), 2);
    }

    #[test]
    fn refresh_rerenders_listing() {
        let mut adapter = RegistryAdapter::new(network(1));
        let mut term = ScriptedTerminal::new(["r", "q"]);
        run(&mut adapter, &mut term, &settings(10, None)).unwrap();
        assert_eq!(term.count("https://net.test/s1/"), 2);
    }

    #[test]
    fn step_from_scope_builds_pending_change() {
        let mut adapter = RegistryAdapter::new(network(1));
        let mut term = ScriptedTerminal::new([""]);
        let settings = settings(10, None);
        let mut session = Session::new(&mut adapter, &mut term, &settings);

        let email = validate("new@net.test").unwrap();
        let next = session
            .step(SessionState::PromptingScope {
                email: email.clone(),
            })
            .unwrap();

        assert_eq!(
            next,
            SessionState::Confirming(PendingChange {
                new_email: email,
                target: Target::AllSites,
                dry_run: false,
            })
        );
    }
}
