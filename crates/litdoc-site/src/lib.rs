//! Documentation site generation for litdoc.
//!
//! Turns compilation targets (files or directories) into one HTML page per
//! source file:
//!
//! - [`Scanner`] finds source files under a target, following symlinked
//!   directories.
//! - [`FileRegistry`] collects the discovered files for page navigation.
//! - [`Destination`] maps source paths to output paths and page URLs, and
//!   writes pages and the stylesheet.
//! - [`PageTemplate`] renders a page with `minijinja`.
//! - [`SiteBuilder`] ties them together and compiles files concurrently.

mod builder;
mod destination;
mod registry;
mod scanner;
mod template;

use std::path::PathBuf;

pub use builder::{BuildReport, SiteBuilder};
pub use destination::Destination;
pub use registry::{FileEntry, FileRegistry};
pub use scanner::Scanner;
pub use template::{PageContext, PageTemplate, Stylesheet};

use litdoc_core::{CompileError, LinkError};

/// Error generating the documentation site.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Template parsing or rendering failed.
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
    /// A source file failed to compile.
    #[error("{}: {source}", .path.display())]
    Compile {
        path: PathBuf,
        #[source]
        source: CompileError,
    },
    /// An output path could not be derived from a source path.
    #[error("{0}")]
    Link(#[from] LinkError),
}
