//! Highlighter output adapter.
//!
//! All code fragments of a file go to the highlighter as one payload,
//! separated by a divider comment (`\n<symbol>DIVIDER\n`). The highlighter
//! answers with one HTML block:
//!
//! ```text
//! <div class="highlight"><pre>...<span class="c1">//DIVIDER</span>
//! ...</pre></div>
//! ```
//!
//! This module owns every assumption about that output shape: the block
//! wrapper, how the divider reappears inside the markup, and the blank lines
//! the highlighter may add around it.

use regex::Regex;

use super::HighlightError;
use crate::section::Section;

/// Opening wrapper of a highlighted block.
pub const HIGHLIGHT_START: &str = r#"<div class="highlight"><pre>"#;
/// Closing wrapper of a highlighted block.
pub const HIGHLIGHT_END: &str = "</pre></div>";

/// Empty span newer highlighter versions emit right after the opening `<pre>`.
const EMPTY_SPAN: &str = "<span></span>";

/// Escapes applied by the Pygments HTML formatter.
const HTML_ESCAPES: [(char, &str); 5] = [
    ('&', "&amp;"),
    ('<', "&lt;"),
    ('>', "&gt;"),
    ('"', "&quot;"),
    ('\'', "&#39;"),
];

/// Divider line placed between code fragments in the request payload.
pub fn divider(symbol: &str) -> String {
    format!("\n{symbol}DIVIDER\n")
}

/// Join the code of every section into one highlighter payload.
pub fn build_request(sections: &[Section], symbol: &str) -> String {
    let divider = divider(symbol);
    sections
        .iter()
        .map(|section| section.code.as_str())
        .collect::<Vec<_>>()
        .join(&divider)
}

/// Splits combined highlighter output back into per-section fragments.
#[derive(Debug)]
pub struct Reconciler {
    divider_re: Regex,
}

impl Reconciler {
    /// Build a reconciler for the divider of comment symbol `symbol`.
    ///
    /// The divider may come back wrapped in a comment span (`c`, `c1`, `ch`,
    /// ...) or bare, with the symbol HTML-escaped, and with any number of
    /// newlines on either side.
    pub fn new(symbol: &str) -> Result<Self, HighlightError> {
        let symbol = regex::escape(&escape_html(symbol));
        let pattern = format!(r#"\n*(?:<span class="c\w?">)?{symbol}DIVIDER(?:</span>)?\n*"#);
        Ok(Self {
            divider_re: Regex::new(&pattern)?,
        })
    }

    /// Split `output` into exactly `expected` highlighted fragments.
    ///
    /// The block wrapper is stripped once from the whole output and put back
    /// around every fragment. A different fragment count means a divider was
    /// lost or duplicated, and is reported as [`HighlightError::Mismatch`].
    pub fn reconcile(&self, output: &str, expected: usize) -> Result<Vec<String>, HighlightError> {
        let body = strip_wrapper(output);
        let fragments: Vec<String> = self
            .divider_re
            .split(body)
            .map(|part| format!("{HIGHLIGHT_START}{part}{HIGHLIGHT_END}"))
            .collect();

        if fragments.len() != expected {
            return Err(HighlightError::Mismatch {
                expected,
                found: fragments.len(),
            });
        }
        Ok(fragments)
    }
}

/// Remove the single global preamble and postamble.
fn strip_wrapper(output: &str) -> &str {
    let body = output.trim_end();
    let body = match body.find(HIGHLIGHT_START) {
        Some(start) => &body[start + HIGHLIGHT_START.len()..],
        None => body,
    };
    let body = body.strip_suffix(HIGHLIGHT_END).unwrap_or(body);
    body.strip_prefix(EMPTY_SPAN).unwrap_or(body)
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match HTML_ESCAPES.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => escaped.push_str(to),
            None => escaped.push(c),
        }
    }
    escaped
}
