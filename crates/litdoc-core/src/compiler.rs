//! Per-file compilation: split, highlight, assemble.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::assemble::{RenderedSection, assemble};
use crate::highlight::{HighlightCoordinator, HighlightError, Highlighter};
use crate::language::ExtensionMap;
use crate::links::{LinkError, UrlRewriter};
use crate::prose::{DocRenderer, MarkdownDocs};
use crate::section::split_sections;

/// Error compiling one source file.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// No language is configured for the file's extension.
    #[error("no language configured for {}", .0.display())]
    UnsupportedExtension(PathBuf),
    /// A documentation link could not be rewritten.
    #[error("{0}")]
    Link(#[from] LinkError),
    /// Highlighting failed or could not be reconciled.
    #[error("{0}")]
    Highlight(#[from] HighlightError),
}

fn identity_url(path: &str) -> Result<String, LinkError> {
    Ok(path.to_owned())
}

/// Compiles source files into rendered sections.
///
/// # Example
///
/// ```ignore
/// use litdoc_core::{Compiler, ExtensionMap, ProcessHighlighter};
///
/// let compiler = Compiler::new(ExtensionMap::builtin(), ProcessHighlighter::default());
/// let sections = compiler.compile(Path::new("lib/parser.js"), &source).await?;
/// ```
pub struct Compiler<H, D = MarkdownDocs> {
    extensions: ExtensionMap,
    coordinator: HighlightCoordinator<H>,
    docs: D,
    rewriter: Arc<dyn UrlRewriter>,
}

impl<H: Highlighter> Compiler<H> {
    /// Create a compiler with Markdown documentation and no link rewriting.
    pub fn new(extensions: ExtensionMap, highlighter: H) -> Self {
        Self {
            extensions,
            coordinator: HighlightCoordinator::new(highlighter),
            docs: MarkdownDocs::default(),
            rewriter: Arc::new(identity_url),
        }
    }
}

impl<H: Highlighter, D: DocRenderer> Compiler<H, D> {
    /// Replace the documentation renderer.
    #[must_use]
    pub fn with_docs<D2: DocRenderer>(self, docs: D2) -> Compiler<H, D2> {
        Compiler {
            extensions: self.extensions,
            coordinator: self.coordinator,
            docs,
            rewriter: self.rewriter,
        }
    }

    /// Set the rewriter for `(file:...)` documentation links.
    #[must_use]
    pub fn with_rewriter(mut self, rewriter: Arc<dyn UrlRewriter>) -> Self {
        self.rewriter = rewriter;
        self
    }

    /// Compile `source`, read from `path`, into rendered sections.
    ///
    /// Any failure is fatal for the file: no partial output is returned.
    pub async fn compile(
        &self,
        path: &Path,
        source: &str,
    ) -> Result<Vec<RenderedSection>, CompileError> {
        let meta = self
            .extensions
            .lookup(path)
            .ok_or_else(|| CompileError::UnsupportedExtension(path.to_path_buf()))?;

        let sections = split_sections(meta, source, self.rewriter.as_ref())?;
        let highlighted = self.coordinator.highlight_sections(&sections, meta).await?;
        Ok(assemble(&sections, highlighted, &self.docs))
    }
}
