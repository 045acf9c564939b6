//! Per-extension language metadata.
//!
//! A [`LanguageMeta`] names the highlighter grammar and the single-line
//! comment token for one kind of source file. [`ExtensionMap`] maps file
//! extensions (`.js`, `.py`, ...) to that metadata.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Highlighter grammar and line-comment token for a source language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageMeta {
    /// Grammar name passed to the highlighter (e.g. `javascript`).
    pub language: String,
    /// Single-line comment token (e.g. `//`).
    pub symbol: String,
}

impl LanguageMeta {
    /// Create metadata from a grammar name and comment token.
    pub fn new(language: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            symbol: symbol.into(),
        }
    }
}

/// Built-in extension table: (extension, highlighter grammar, comment token).
const BUILTIN: &[(&str, &str, &str)] = &[
    (".js", "javascript", "//"),
    (".mjs", "javascript", "//"),
    (".ts", "typescript", "//"),
    (".coffee", "coffeescript", "#"),
    (".py", "python", "#"),
    (".rb", "ruby", "#"),
    (".pl", "perl", "#"),
    (".sh", "bash", "#"),
    (".rs", "rust", "//"),
    (".go", "go", "//"),
    (".c", "c", "//"),
    (".h", "c", "//"),
    (".cpp", "cpp", "//"),
    (".java", "java", "//"),
    (".scala", "scala", "//"),
    (".swift", "swift", "//"),
    (".php", "php", "//"),
    (".lua", "lua", "--"),
    (".sql", "sql", "--"),
    (".hs", "haskell", "--"),
    (".yaml", "yaml", "#"),
    (".toml", "toml", "#"),
];

/// Mapping from file extension to [`LanguageMeta`].
///
/// Keys always carry a leading dot, matching what [`ExtensionMap::lookup`]
/// derives from a path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionMap {
    entries: BTreeMap<String, LanguageMeta>,
}

impl ExtensionMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map pre-populated with the built-in languages.
    #[must_use]
    pub fn builtin() -> Self {
        let mut map = Self::new();
        for (ext, language, symbol) in BUILTIN {
            map.insert(ext, LanguageMeta::new(*language, *symbol));
        }
        map
    }

    /// Insert or replace an entry. A missing leading dot is added.
    pub fn insert(&mut self, extension: &str, meta: LanguageMeta) {
        self.entries.insert(normalize_extension(extension), meta);
    }

    /// Merge entries from another map, overriding existing extensions.
    pub fn extend(&mut self, other: ExtensionMap) {
        self.entries.extend(other.entries);
    }

    /// Metadata for the extension of `path`, if known.
    pub fn lookup(&self, path: &Path) -> Option<&LanguageMeta> {
        let ext = path.extension()?.to_str()?;
        self.entries.get(&format!(".{ext}"))
    }

    /// Whether `path` has an extension this map knows.
    pub fn matches(&self, path: &Path) -> bool {
        self.lookup(path).is_some()
    }

    /// Metadata for an extension key (with or without leading dot).
    pub fn get(&self, extension: &str) -> Option<&LanguageMeta> {
        self.entries.get(&normalize_extension(extension))
    }

    /// Iterate over `(extension, meta)` pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LanguageMeta)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, LanguageMeta)> for ExtensionMap {
    fn from_iter<I: IntoIterator<Item = (String, LanguageMeta)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (ext, meta) in iter {
            map.insert(&ext, meta);
        }
        map
    }
}

fn normalize_extension(extension: &str) -> String {
    if extension.starts_with('.') {
        extension.to_owned()
    } else {
        format!(".{extension}")
    }
}
