//! Literate documentation core.
//!
//! Turns an annotated source file into an ordered list of rendered
//! (documentation, code) sections:
//!
//! 1. [`split_sections`] separates comment runs from code runs using the
//!    language's line-comment symbol, rewriting `(file:...)` links on the way.
//! 2. [`HighlightCoordinator`] sends all code to the highlighter in one
//!    request and splits the answer back into per-section HTML.
//! 3. [`assemble`] pairs each section's rendered documentation with its
//!    highlighted code.
//!
//! [`Compiler`] runs the three steps for one file.
//!
//! # Example
//!
//! ```ignore
//! use litdoc_core::{Compiler, ExtensionMap, ProcessHighlighter};
//!
//! let compiler = Compiler::new(ExtensionMap::builtin(), ProcessHighlighter::default());
//! let sections = compiler.compile(path, &source).await?;
//! for section in sections {
//!     println!("{:?} {}", section.doc, section.code);
//! }
//! ```

mod assemble;
mod compiler;
pub mod highlight;
mod language;
mod links;
mod prose;
mod section;

pub use assemble::{RenderedSection, assemble};
pub use compiler::{CompileError, Compiler};
pub use highlight::{HighlightCoordinator, HighlightError, Highlighter, ProcessHighlighter};
pub use language::{ExtensionMap, LanguageMeta};
pub use links::{LinkError, UrlRewriter, rewrite_links};
pub use prose::{DocRenderer, MarkdownDocs};
pub use section::{Section, split_sections};
