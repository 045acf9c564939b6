//! Documentation prose rendering.

use pulldown_cmark::{Options, Parser, html};

/// Converts section documentation text to HTML.
pub trait DocRenderer: Send + Sync {
    fn render_doc(&self, text: &str) -> String;
}

impl<F> DocRenderer for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn render_doc(&self, text: &str) -> String {
        self(text)
    }
}

/// Markdown renderer backed by `pulldown-cmark`.
///
/// GitHub Flavored Markdown (tables, strikethrough, task lists) is enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownDocs;

impl MarkdownDocs {
    const OPTIONS: Options = Options::ENABLE_TABLES
        .union(Options::ENABLE_STRIKETHROUGH)
        .union(Options::ENABLE_TASKLISTS)
        .union(Options::ENABLE_GFM);

    pub fn new() -> Self {
        Self
    }
}

impl DocRenderer for MarkdownDocs {
    fn render_doc(&self, text: &str) -> String {
        let parser = Parser::new_ext(text, Self::OPTIONS);
        let mut out = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}
