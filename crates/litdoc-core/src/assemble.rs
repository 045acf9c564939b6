//! Pairing rendered documentation with highlighted code.

use serde::Serialize;

use crate::prose::DocRenderer;
use crate::section::Section;

/// A section ready for page rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedSection {
    /// Documentation HTML, `None` when the section has no documentation.
    pub doc: Option<String>,
    /// Highlighted code HTML.
    pub code: String,
}

/// Combine sections with their highlighted code, by index.
///
/// `highlighted` must hold exactly one fragment per section.
pub fn assemble<D>(sections: &[Section], highlighted: Vec<String>, docs: &D) -> Vec<RenderedSection>
where
    D: DocRenderer + ?Sized,
{
    debug_assert_eq!(sections.len(), highlighted.len());
    sections
        .iter()
        .zip(highlighted)
        .map(|(section, code)| RenderedSection {
            doc: (!section.doc.is_empty()).then(|| docs.render_doc(&section.doc)),
            code,
        })
        .collect()
}
