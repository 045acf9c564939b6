//! Source discovery by filesystem walking.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use litdoc_core::ExtensionMap;
use tracing::{debug, info, warn};

/// Finds the source files of a compilation target.
///
/// A file target is reported as-is. A directory target is walked, reporting
/// every file whose extension has a configured language. Hidden entries are
/// skipped and entries are visited in name order. Symlinked directories are
/// followed unless they lead back into a directory being walked.
///
/// Walking does blocking filesystem I/O; async callers run it on a
/// blocking thread.
#[derive(Debug, Clone)]
pub struct Scanner {
    extensions: ExtensionMap,
    recurse: bool,
}

impl Scanner {
    pub fn new(extensions: ExtensionMap) -> Self {
        Self {
            extensions,
            recurse: true,
        }
    }

    /// Whether to descend into subdirectories (default `true`).
    #[must_use]
    pub fn recurse(mut self, recurse: bool) -> Self {
        self.recurse = recurse;
        self
    }

    /// Source files of `target`, in walk order.
    pub fn scan(&self, target: &Path) -> Vec<PathBuf> {
        let mut found = Vec::new();
        if target.is_dir() {
            let mut ancestors = HashSet::new();
            self.scan_directory(target, &mut ancestors, &mut found);
        } else {
            found.push(target.to_path_buf());
        }
        found
    }

    /// `ancestors` holds the canonical paths of the directories currently
    /// being walked.
    fn scan_directory(
        &self,
        dir: &Path,
        ancestors: &mut HashSet<PathBuf>,
        found: &mut Vec<PathBuf>,
    ) {
        let real = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
        if !ancestors.insert(real.clone()) {
            debug!(path = %dir.display(), "Symlink loop, skipping");
            return;
        }
        self.walk_entries(dir, ancestors, found);
        ancestors.remove(&real);
    }

    fn walk_entries(&self, dir: &Path, ancestors: &mut HashSet<PathBuf>, found: &mut Vec<PathBuf>) {
        info!("compiling {}...", dir.display());

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "Cannot read directory");
                return;
            }
        };

        // fs::metadata follows symlinks, so a link to a directory is walked
        let mut entries: Vec<_> = entries
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(path = %dir.display(), error = %e, "Cannot read directory entry");
                    None
                }
            })
            .map(|e| {
                let path = e.path();
                let is_dir = fs::metadata(&path).is_ok_and(|meta| meta.is_dir());
                (path, e.file_name(), is_dir)
            })
            .collect();
        entries.sort_by(|a, b| a.1.cmp(&b.1));

        for (path, name, is_dir) in entries {
            if name.to_string_lossy().starts_with('.') {
                continue;
            }

            if is_dir {
                if self.recurse {
                    self.scan_directory(&path, ancestors, found);
                }
            } else if self.extensions.matches(&path) {
                found.push(path);
            }
        }
    }
}
