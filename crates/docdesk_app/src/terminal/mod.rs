//! Terminal front end: prints view changes and asks for confirmation.
pub mod render;

use std::collections::HashSet;
use std::io::{self, BufRead, Write};

use docdesk_core::{AppViewModel, Page};
use docdesk_engine::{Confirm, ViewSink};

/// Prints the lines of the focused page that were not on screen in the
/// previous render.
pub struct TerminalView<W: Write + Send> {
    focus: Page,
    previous: HashSet<String>,
    out: W,
}

impl TerminalView<io::Stdout> {
    pub fn stdout(focus: Page, initial: &AppViewModel) -> Self {
        Self::new(focus, initial, io::stdout())
    }
}

impl<W: Write + Send> TerminalView<W> {
    /// `initial` is treated as already shown.
    pub fn new(focus: Page, initial: &AppViewModel, out: W) -> Self {
        Self {
            focus,
            previous: render::live_lines(initial, focus).into_iter().collect(),
            out,
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> ViewSink for TerminalView<W> {
    fn render(&mut self, view: &AppViewModel) {
        let lines = render::live_lines(view, self.focus);
        for line in lines.iter().filter(|line| !self.previous.contains(*line)) {
            let _ = writeln!(self.out, "{line}");
        }
        let _ = self.out.flush();
        self.previous = lines.into_iter().collect();
    }
}

/// Reads `y/N` answers from stdin.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        let _ = io::stdout().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }
}

/// Accepts every prompt (`--yes`).
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _prompt: &str) -> bool {
        true
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
