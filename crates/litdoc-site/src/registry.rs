//! Discovered source files.

use std::path::Path;

use litdoc_core::LinkError;
use serde::Serialize;

use crate::destination::Destination;

/// A source file with a generated page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// Source path as discovered.
    pub path: String,
    /// Final path component.
    pub filename: String,
    /// Root-relative page URL.
    pub url: String,
}

impl FileEntry {
    pub fn new(path: &Path, url: String) -> Self {
        Self {
            path: path.display().to_string(),
            filename: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            url,
        }
    }
}

/// Every file discovered during a build, in discovery order.
///
/// Exposed to page templates as `files`.
#[derive(Debug, Default)]
pub struct FileRegistry {
    files: Vec<FileEntry>,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path`, discovered under `destination`.
    pub fn register(
        &mut self,
        destination: &Destination,
        path: &Path,
    ) -> Result<&FileEntry, LinkError> {
        let url = destination.page_url(path)?;
        self.files.push(FileEntry::new(path, url));
        Ok(&self.files[self.files.len() - 1])
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn into_files(self) -> Vec<FileEntry> {
        self.files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn test_register_computes_url() {
        let dest = Destination::new(PathBuf::from("proj"), PathBuf::from("docs"), None);
        let mut registry = FileRegistry::new();

        let entry = registry.register(&dest, Path::new("proj/lib/parser.js")).unwrap();

        assert_eq!(
            entry,
            &FileEntry {
                path: "proj/lib/parser.js".to_owned(),
                filename: "parser.js".to_owned(),
                url: "/lib/parser.js.html".to_owned(),
            }
        );
    }

    #[test]
    fn test_keeps_discovery_order() {
        let dest = Destination::new(PathBuf::from("p"), PathBuf::from("docs"), None);
        let mut registry = FileRegistry::new();
        registry.register(&dest, Path::new("p/b.py")).unwrap();
        registry.register(&dest, Path::new("p/a.py")).unwrap();

        assert_eq!(registry.len(), 2);
        let names: Vec<_> = registry.into_files().into_iter().map(|f| f.filename).collect();
        assert_eq!(names, vec!["b.py", "a.py"]);
    }

    #[test]
    fn test_unmappable_path_is_not_registered() {
        let dest = Destination::new(PathBuf::from("p"), PathBuf::from("docs"), None);
        let mut registry = FileRegistry::new();

        assert!(registry.register(&dest, Path::new("p")).is_err());
        assert!(registry.is_empty());
    }
}
