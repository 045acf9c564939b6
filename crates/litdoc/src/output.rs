//! Colored terminal output utilities.

use console::{Style, Term};

/// Width of the right-aligned status label.
const LABEL_WIDTH: usize = 12;

/// Terminal output formatter, writing to stderr.
///
/// Status lines are printed as a right-aligned label followed by a message:
///
/// ```text
///       Output docs
///     Finished 12 page(s)
/// ```
pub(crate) struct Output {
    term: Term,
    status: Style,
    finished: Style,
    error: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            status: Style::new().cyan().bold(),
            finished: Style::new().green().bold(),
            error: Style::new().red(),
        }
    }

    /// Print a plain line.
    pub(crate) fn line(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Print a status line with a cyan label.
    pub(crate) fn status(&self, label: &str, msg: &str) {
        self.labelled(&self.status, label, msg);
    }

    /// Print the final status line with a green label.
    pub(crate) fn finished(&self, msg: &str) {
        self.labelled(&self.finished, "Finished", msg);
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.error.apply_to(msg).to_string());
    }

    fn labelled(&self, style: &Style, label: &str, msg: &str) {
        let label = format!("{label:>LABEL_WIDTH$}");
        let _ = self
            .term
            .write_line(&format!("{} {msg}", style.apply_to(label)));
    }
}
