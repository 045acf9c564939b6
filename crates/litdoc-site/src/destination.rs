//! Output location for compiled pages.
//!
//! A destination is created per compilation target. It knows the target's
//! base directory (the directory itself, or a file target's parent), the
//! directory pages are written to, and an optional path fragment to drop.
//!
//! With a base directory of `some/dir` and `ignore_dirs` of `application`,
//! `some/dir/application/file.js` is written to `{target_dir}/file.js.html`
//! and linked as `/file.js.html`.

use std::path::{Component, Path, PathBuf};

use litdoc_core::{LinkError, UrlRewriter};
use tracing::debug;

use crate::SiteError;
use crate::template::{PageContext, PageTemplate, Stylesheet};

const PAGE_SUFFIX: &str = ".html";

/// Maps source paths under one base directory to generated pages.
#[derive(Debug, Clone)]
pub struct Destination {
    base_dir: PathBuf,
    target_dir: PathBuf,
    ignore_dirs: Option<String>,
}

impl Destination {
    pub fn new(base_dir: PathBuf, target_dir: PathBuf, ignore_dirs: Option<String>) -> Self {
        Self {
            base_dir,
            target_dir,
            ignore_dirs: ignore_dirs.filter(|dirs| !dirs.is_empty()),
        }
    }

    /// Output file for the page of `path`.
    pub fn target_name(&self, path: &Path) -> Result<PathBuf, LinkError> {
        let relative = self.relative_name(path)?;
        Ok(self.target_dir.join(format!("{relative}{PAGE_SUFFIX}")))
    }

    /// Root-relative URL of the page of `path` (e.g. `/lib/parser.js.html`).
    pub fn page_url(&self, path: &Path) -> Result<String, LinkError> {
        let relative = self.relative_name(path)?;
        Ok(format!("/{relative}{PAGE_SUFFIX}"))
    }

    /// Render the page of `context.file` and write it to its target name.
    ///
    /// Parent directories are created as needed. Returns the written path.
    pub async fn render(
        &self,
        template: &PageTemplate,
        context: &PageContext<'_>,
    ) -> Result<PathBuf, SiteError> {
        let target = self.target_name(Path::new(&context.file.path))?;
        let html = template.render(context)?;

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, html).await?;
        debug!(path = %target.display(), "Wrote page");
        Ok(target)
    }

    /// Write the stylesheet into the target directory.
    pub async fn write_media(&self, stylesheet: &Stylesheet) -> Result<PathBuf, SiteError> {
        tokio::fs::create_dir_all(&self.target_dir).await?;
        let target = self.target_dir.join(stylesheet.name());
        tokio::fs::write(&target, stylesheet.contents()).await?;
        Ok(target)
    }

    /// Path of `path` below the base directory with `ignore_dirs` removed,
    /// as `/`-separated segments.
    fn relative_name(&self, path: &Path) -> Result<String, LinkError> {
        let stripped = path.strip_prefix(&self.base_dir).unwrap_or(path);

        let mut segments = Vec::new();
        for component in stripped.components() {
            match component {
                Component::Normal(segment) => segments.push(segment.to_string_lossy()),
                Component::ParentDir => {
                    return Err(link_error(path, "path leaves the base directory"));
                }
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            }
        }
        let mut relative = segments.join("/");

        if let Some(ignore) = &self.ignore_dirs {
            relative = relative
                .replacen(ignore.as_str(), "", 1)
                .split('/')
                .filter(|segment| !segment.is_empty())
                .collect::<Vec<_>>()
                .join("/");
        }

        if relative.is_empty() {
            return Err(link_error(path, "empty page name"));
        }
        Ok(relative)
    }
}

fn link_error(path: &Path, reason: &str) -> LinkError {
    LinkError {
        path: path.display().to_string(),
        reason: reason.to_owned(),
    }
}

impl UrlRewriter for Destination {
    fn rewrite_url(&self, path: &str) -> Result<String, LinkError> {
        self.page_url(Path::new(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FileEntry;
    use litdoc_core::RenderedSection;
    use pretty_assertions::assert_eq;

    fn destination(ignore_dirs: Option<&str>) -> Destination {
        Destination::new(
            PathBuf::from("some/dir"),
            PathBuf::from("/out"),
            ignore_dirs.map(str::to_owned),
        )
    }

    #[test]
    fn test_target_name_strips_base_dir() {
        let dest = destination(None);
        assert_eq!(
            dest.target_name(Path::new("some/dir/lib/parser.js")).unwrap(),
            PathBuf::from("/out/lib/parser.js.html")
        );
    }

    #[test]
    fn test_target_name_drops_ignore_dirs() {
        let dest = destination(Some("application"));
        assert_eq!(
            dest.target_name(Path::new("some/dir/application/file.js")).unwrap(),
            PathBuf::from("/out/file.js.html")
        );
    }

    #[test]
    fn test_ignore_dirs_removes_first_occurrence_only() {
        let dest = destination(Some("app"));
        assert_eq!(
            dest.page_url(Path::new("some/dir/app/x/app/y.js")).unwrap(),
            "/x/app/y.js.html"
        );
    }

    #[test]
    fn test_empty_ignore_dirs_is_ignored() {
        let dest = destination(Some(""));
        assert_eq!(dest.page_url(Path::new("some/dir/a.js")).unwrap(), "/a.js.html");
    }

    #[test]
    fn test_rewrite_url_for_path_outside_base() {
        let dest = destination(None);
        assert_eq!(dest.rewrite_url("lib/parser.js").unwrap(), "/lib/parser.js.html");
        assert_eq!(dest.rewrite_url("./lib/utils.js").unwrap(), "/lib/utils.js.html");
    }

    #[test]
    fn test_rewrite_url_rejects_parent_dir() {
        let dest = destination(None);
        let err = dest.rewrite_url("../secret.js").unwrap_err();
        assert_eq!(err.path, "../secret.js");
    }

    #[test]
    fn test_rewrite_url_rejects_empty() {
        let dest = destination(None);
        assert!(dest.rewrite_url("").is_err());
    }

    #[tokio::test]
    async fn test_render_creates_directories() {
        let temp = tempfile::tempdir().unwrap();
        let base = temp.path().join("src");
        let dest = Destination::new(base.clone(), temp.path().join("docs"), None);
        let template = PageTemplate::from_source("{{ file.filename }}:{{ sections|length }}").unwrap();

        let source = base.join("nested/deep/mod.py");
        let file = FileEntry::new(&source, "/nested/deep/mod.py.html".to_owned());
        let sections = vec![RenderedSection {
            doc: None,
            code: "x".to_owned(),
        }];
        let context = PageContext::new(&file, &sections, &[], "", "base.css");

        let written = dest.render(&template, &context).await.unwrap();

        assert_eq!(written, temp.path().join("docs/nested/deep/mod.py.html"));
        assert_eq!(std::fs::read_to_string(written).unwrap(), "mod.py:1");
    }

    #[tokio::test]
    async fn test_write_media_into_target_dir() {
        let temp = tempfile::tempdir().unwrap();
        let dest = Destination::new(temp.path().join("src"), temp.path().join("docs"), None);

        let written = dest.write_media(&Stylesheet::builtin()).await.unwrap();

        assert_eq!(written, temp.path().join("docs/base.css"));
        assert!(std::fs::read_to_string(written).unwrap().contains(".highlight"));
    }
}
