//! Line pager driven through a [`Terminal`].

use admin_email_core::PagerState;

use crate::error::CliError;
use crate::terminal::Terminal;

/// Page `lines` with forward/back/quit navigation.
pub fn page_lines<S: AsRef<str>>(
    term: &mut dyn Terminal,
    lines: &[S],
    page_size: usize,
) -> Result<(), CliError> {
    let mut pager = PagerState::new(lines.len(), page_size);
    loop {
        for line in &lines[pager.visible()] {
            term.line(line.as_ref());
        }
        term.line("");
        term.line(&pager.footer());

        let input = term.prompt(pager.prompt())?;
        if !pager.apply(pager.key_for(&input)) {
            return Ok(());
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::terminal::testing::ScriptedTerminal;

    fn doc(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("line {i}")).collect()
    }

    #[test]
    fn short_document_quits_on_enter() {
        let mut term = ScriptedTerminal::new([""]);
        page_lines(&mut term, &doc(3), 10).unwrap();
        assert_eq!(
            term.transcript(),
            vec!["line 1", "line 2", "line 3", "", "Lines 1–3 of 3"]
        );
        assert_eq!(term.prompts, vec!["[Q] quit, [B] back"]);
    }

    #[test]
    fn walks_forward_then_back() {
        let mut term = ScriptedTerminal::new(["", "b", "q"]);
        page_lines(&mut term, &doc(15), 10).unwrap();
        assert_eq!(term.count("Lines 1–10 of 15"), 2);
        assert_eq!(term.count("Lines 11–15 of 15"), 1);
        assert_eq!(term.remaining(), 0);
    }

    #[test]
    fn quit_on_first_page() {
        let mut term = ScriptedTerminal::new(["Q"]);
        page_lines(&mut term, &doc(30), 10).unwrap();
        assert!(!term.contains("line 11"));
    }
}
