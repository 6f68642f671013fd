//! Colored terminal output utilities.

use console::{Style, Term};

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
    silent: bool,
    green: Style,
    red: Style,
    cyan_bold: Style,
}

impl Output {
    /// Create a new output formatter. With `silent`, all output is dropped.
    #[must_use]
    pub(crate) fn new(silent: bool) -> Self {
        Self {
            term: Term::stderr(),
            silent,
            green: Style::new().green(),
            red: Style::new().red(),
            cyan_bold: Style::new().cyan().bold(),
        }
    }

    /// Print an info message.
    pub(crate) fn info(&self, msg: &str) {
        if !self.silent {
            let _ = self.term.write_line(msg);
        }
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        if !self.silent {
            let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
        }
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        if !self.silent {
            let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
        }
    }

    /// Print a highlighted message (cyan bold).
    pub(crate) fn highlight(&self, msg: &str) {
        if !self.silent {
            let _ = self
                .term
                .write_line(&self.cyan_bold.apply_to(msg).to_string());
        }
    }
}
