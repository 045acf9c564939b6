//! Splitting source text into documentation/code sections.

use serde::Serialize;

use crate::language::LanguageMeta;
use crate::links::{LinkError, UrlRewriter, rewrite_links};

/// One (documentation, code) pair from a source file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Comment text with the marker stripped, one line per comment line.
    pub doc: String,
    /// Raw code lines, each terminated by a newline.
    pub code: String,
}

impl Section {
    pub fn new(doc: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            doc: doc.into(),
            code: code.into(),
        }
    }
}

/// Accumulates lines until code is followed by a new comment run.
#[derive(Default)]
struct SectionBuilder {
    sections: Vec<Section>,
    doc: String,
    code: String,
    has_code: bool,
}

impl SectionBuilder {
    fn push_doc(&mut self, text: &str) {
        if self.has_code {
            self.flush();
        }
        self.doc.push_str(text);
        self.doc.push('\n');
    }

    fn push_code(&mut self, line: &str) {
        self.has_code = true;
        self.code.push_str(line);
        self.code.push('\n');
    }

    fn flush(&mut self) {
        self.sections.push(Section {
            doc: std::mem::take(&mut self.doc),
            code: std::mem::take(&mut self.code),
        });
        self.has_code = false;
    }

    fn finish(mut self) -> Vec<Section> {
        self.flush();
        self.sections
    }
}

/// Return the documentation text of a comment line, or `None` for code.
///
/// A comment line is optional leading whitespace, the comment symbol, and
/// at most one space before the documentation text.
fn comment_text<'a>(line: &'a str, symbol: &str) -> Option<&'a str> {
    let rest = line.trim_start().strip_prefix(symbol)?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// Split `source` into sections using the comment symbol from `meta`.
///
/// Consecutive comment lines coalesce into one section's documentation; a
/// new section starts only when a comment follows code. A final section is
/// always emitted, so the result is never empty. `(file:...)` links in
/// comments are rewritten through `rewriter`.
pub fn split_sections<R>(
    meta: &LanguageMeta,
    source: &str,
    rewriter: &R,
) -> Result<Vec<Section>, LinkError>
where
    R: UrlRewriter + ?Sized,
{
    let mut builder = SectionBuilder::default();
    for line in source.lines() {
        match comment_text(line, &meta.symbol) {
            Some(text) => builder.push_doc(&rewrite_links(text, rewriter)?),
            None => builder.push_code(line),
        }
    }
    Ok(builder.finish())
}
