//! Cross-file link rewriting in documentation text.
//!
//! Documentation may reference other source files as `(file:lib/other.js)`.
//! Each reference is handed to a [`UrlRewriter`] and replaced with the URL
//! of that file's generated page.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static FILE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(file:(.*?)\)").unwrap());

/// Error returned when a link target cannot be rewritten.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot rewrite link to {path}: {reason}")]
pub struct LinkError {
    /// Path as written in the documentation.
    pub path: String,
    /// Why the rewrite failed.
    pub reason: String,
}

/// Maps a source path referenced from documentation to a page URL.
pub trait UrlRewriter: Send + Sync {
    fn rewrite_url(&self, path: &str) -> Result<String, LinkError>;
}

impl<F> UrlRewriter for F
where
    F: Fn(&str) -> Result<String, LinkError> + Send + Sync,
{
    fn rewrite_url(&self, path: &str) -> Result<String, LinkError> {
        self(path)
    }
}

/// Replace every `(file:<path>)` in `text` with `(<rewritten url>)`.
///
/// Returns the input borrowed when it contains no file links. The first
/// rewrite failure aborts the whole line.
pub fn rewrite_links<'a, R>(text: &'a str, rewriter: &R) -> Result<Cow<'a, str>, LinkError>
where
    R: UrlRewriter + ?Sized,
{
    if !text.contains("(file:") {
        return Ok(Cow::Borrowed(text));
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in FILE_LINK_RE.captures_iter(text) {
        let (Some(whole), Some(path)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&text[last..whole.start()]);
        out.push('(');
        out.push_str(&rewriter.rewrite_url(path.as_str())?);
        out.push(')');
        last = whole.end();
    }
    out.push_str(&text[last..]);
    Ok(Cow::Owned(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs_rewriter(path: &str) -> Result<String, LinkError> {
        Ok(format!("/docs/{}.html", path.trim_start_matches("lib/")))
    }

    #[test]
    fn test_rewrites_file_link() {
        let out = rewrite_links("see [other](file:lib/other.js) too", &docs_rewriter).unwrap();
        assert_eq!(out, "see [other](/docs/other.js.html) too");
    }

    #[test]
    fn test_rewrites_multiple_links_lazily() {
        let out = rewrite_links("(file:lib/a.js) and (file:lib/b.js)", &docs_rewriter).unwrap();
        assert_eq!(out, "(/docs/a.js.html) and (/docs/b.js.html)");
    }

    #[test]
    fn test_plain_text_is_borrowed() {
        let out = rewrite_links("nothing to see (here)", &docs_rewriter).unwrap();
        assert!(matches!(out, Cow::Borrowed("nothing to see (here)")));
    }

    #[test]
    fn test_other_schemes_untouched() {
        let out = rewrite_links("[x](http://example.com)", &docs_rewriter).unwrap();
        assert_eq!(out, "[x](http://example.com)");
    }

    #[test]
    fn test_rewriter_failure_propagates() {
        let failing = |path: &str| -> Result<String, LinkError> {
            Err(LinkError {
                path: path.to_owned(),
                reason: "outside base directory".to_owned(),
            })
        };
        let err = rewrite_links("(file:../etc/passwd)", &failing).unwrap_err();
        assert_eq!(err.path, "../etc/passwd");
        assert!(err.to_string().contains("outside base directory"));
    }
}
