//! Batched syntax highlighting of section code.
//!
//! The code of every section in a file is sent to the highlighter in a
//! single request, separated by divider comments, and the combined output is
//! split back into one HTML fragment per section:
//!
//! - [`Highlighter`]: the external collaborator turning code into HTML
//! - [`ProcessHighlighter`]: runs an external program (`pygmentize`)
//! - [`HighlightCoordinator`]: builds the request and reconciles the answer
//! - [`reconcile`]: every assumption about the highlighter's output format

mod process;
pub mod reconcile;

use std::future::Future;
use std::io;
use std::time::Duration;

pub use process::{DEFAULT_ARGS, DEFAULT_PROGRAM, DEFAULT_TIMEOUT, ProcessHighlighter};

use crate::language::LanguageMeta;
use crate::section::Section;
use reconcile::{Reconciler, build_request};

/// Highlighting error.
#[derive(Debug, thiserror::Error)]
pub enum HighlightError {
    /// The highlighter program could not be started.
    #[error("failed to start highlighter `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    /// Pipe I/O with the highlighter failed.
    #[error("highlighter I/O error: {0}")]
    Io(#[from] io::Error),
    /// The highlighter wrote to its error stream.
    #[error("highlighter error:\n{stderr}")]
    Process { stderr: String },
    /// The highlighter did not finish in time.
    #[error("highlighter timed out after {0:?}")]
    Timeout(Duration),
    /// The output did not split into one fragment per section.
    #[error("highlighter returned {found} code fragments, expected {expected}")]
    Mismatch { expected: usize, found: usize },
    /// The divider pattern could not be built.
    #[error("invalid divider pattern: {0}")]
    Divider(#[from] regex::Error),
}

/// Turns a code payload into one highlighted HTML block.
pub trait Highlighter: Send + Sync {
    /// Highlight `payload` using grammar `language`.
    fn highlight(
        &self,
        language: &str,
        payload: String,
    ) -> impl Future<Output = Result<String, HighlightError>> + Send;
}

/// Highlights the code of a section list with one highlighter call.
#[derive(Debug, Clone, Default)]
pub struct HighlightCoordinator<H> {
    highlighter: H,
}

impl<H: Highlighter> HighlightCoordinator<H> {
    pub fn new(highlighter: H) -> Self {
        Self { highlighter }
    }

    /// Highlight every section's code.
    ///
    /// Returns one HTML fragment per section, in section order.
    pub async fn highlight_sections(
        &self,
        sections: &[Section],
        meta: &LanguageMeta,
    ) -> Result<Vec<String>, HighlightError> {
        let reconciler = Reconciler::new(&meta.symbol)?;
        let payload = build_request(sections, &meta.symbol);
        tracing::debug!(
            language = %meta.language,
            sections = sections.len(),
            bytes = payload.len(),
            "Sending code to highlighter"
        );

        let output = self.highlighter.highlight(&meta.language, payload).await?;
        let fragments = reconciler.reconcile(&output, sections.len())?;
        tracing::debug!(fragments = fragments.len(), "Reconciled highlighter output");
        Ok(fragments)
    }
}
