//! Site builder: scan targets, compile files concurrently, write pages.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use litdoc_config::{Config, OutputConfig};
use litdoc_core::{Compiler, ExtensionMap, Highlighter};
use tracing::{debug, error, info};

use crate::SiteError;
use crate::destination::Destination;
use crate::registry::{FileEntry, FileRegistry};
use crate::scanner::Scanner;
use crate::template::{PageContext, PageTemplate, Stylesheet};

/// Outcome of a build.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    /// Pages written.
    pub compiled: usize,
    /// Targets or files that produced no page.
    pub failed: usize,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Builds documentation pages for a set of compilation targets.
///
/// Every target gets its own [`Destination`], so `(file:...)` links resolve
/// against the target's base directory. All discovered files are compiled
/// concurrently; a failing file is logged and counted without affecting
/// the others.
pub struct SiteBuilder<H> {
    extensions: ExtensionMap,
    output: OutputConfig,
    highlighter: H,
    template: Arc<PageTemplate>,
    stylesheet: Stylesheet,
    recurse: bool,
}

/// One file to compile.
struct Job<H> {
    index: usize,
    path: PathBuf,
    destination: Arc<Destination>,
    compiler: Arc<Compiler<H>>,
}

impl<H> SiteBuilder<H>
where
    H: Highlighter + Clone + 'static,
{
    /// Create a builder from resolved configuration.
    ///
    /// Loads the page template and stylesheet up front.
    pub fn new(config: &Config, highlighter: H) -> Result<Self, SiteError> {
        let output = config.output_resolved.clone();
        let template = PageTemplate::load(output.template.as_deref())?;
        let stylesheet = Stylesheet::load(output.stylesheet.as_deref())?;

        Ok(Self {
            extensions: config.extensions_resolved.clone(),
            output,
            highlighter,
            template: Arc::new(template),
            stylesheet,
            recurse: true,
        })
    }

    /// Whether directory targets are walked recursively (default `true`).
    #[must_use]
    pub fn recurse(mut self, recurse: bool) -> Self {
        self.recurse = recurse;
        self
    }

    /// Compile every target and write the stylesheet.
    ///
    /// Per-file failures are reported in the returned [`BuildReport`]; an
    /// error is returned only when the stylesheet cannot be written.
    pub async fn build(&self, targets: &[PathBuf]) -> Result<BuildReport, SiteError> {
        let mut report = BuildReport::default();
        let mut registry = FileRegistry::new();
        let mut jobs = Vec::new();
        let scanner = Scanner::new(self.extensions.clone()).recurse(self.recurse);

        for target in targets {
            let base_dir = match tokio::fs::metadata(target).await {
                Ok(meta) if meta.is_dir() => target.clone(),
                Ok(_) => target.parent().map(Path::to_path_buf).unwrap_or_default(),
                Err(e) => {
                    error!(path = %target.display(), error = %e, "Cannot read target");
                    report.failed += 1;
                    continue;
                }
            };

            let destination = Arc::new(Destination::new(
                base_dir,
                self.output.target_dir.clone(),
                self.output.ignore_dirs.clone(),
            ));
            let rewriter = Arc::clone(&destination);
            let compiler = Arc::new(
                Compiler::new(self.extensions.clone(), self.highlighter.clone())
                    .with_rewriter(rewriter),
            );

            let walker = scanner.clone();
            let root = target.clone();
            let paths = match tokio::task::spawn_blocking(move || walker.scan(&root)).await {
                Ok(paths) => paths,
                Err(e) => {
                    error!(path = %target.display(), error = %e, "Scan task failed");
                    report.failed += 1;
                    continue;
                }
            };

            for path in paths {
                let index = registry.len();
                match registry.register(&destination, &path) {
                    Ok(_) => jobs.push(Job {
                        index,
                        path,
                        destination: Arc::clone(&destination),
                        compiler: Arc::clone(&compiler),
                    }),
                    Err(e) => {
                        error!(path = %path.display(), error = %e, "Cannot map file to a page");
                        report.failed += 1;
                    }
                }
            }
        }

        let media = Destination::new(PathBuf::new(), self.output.target_dir.clone(), None);
        let written = media.write_media(&self.stylesheet).await?;
        info!("wrote {}", written.display());

        let files: Arc<[FileEntry]> = registry.into_files().into();
        debug!(files = files.len(), "Compiling files");

        let mut tasks = Vec::with_capacity(jobs.len());
        for job in jobs {
            let path = job.path.clone();
            let files = Arc::clone(&files);
            let template = Arc::clone(&self.template);
            let base_url = self.output.base_url.clone();
            let stylesheet = self.stylesheet.name().to_owned();
            let task = tokio::spawn(async move {
                job.run(&template, &files, &base_url, &stylesheet).await
            });
            tasks.push((path, task));
        }

        for (path, task) in tasks {
            match task.await {
                Ok(Ok(page)) => {
                    debug!(source = %path.display(), page = %page.display(), "Compiled");
                    report.compiled += 1;
                }
                Ok(Err(e)) => {
                    error!(path = %path.display(), "{e}");
                    report.failed += 1;
                }
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Compile task failed");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}

impl<H: Highlighter> Job<H> {
    async fn run(
        self,
        template: &PageTemplate,
        files: &[FileEntry],
        base_url: &str,
        stylesheet: &str,
    ) -> Result<PathBuf, SiteError> {
        info!("compiling {}...", self.path.display());

        let source = tokio::fs::read_to_string(&self.path).await?;
        let sections = self
            .compiler
            .compile(&self.path, &source)
            .await
            .map_err(|source| SiteError::Compile {
                path: self.path.clone(),
                source,
            })?;

        let context = PageContext::new(&files[self.index], &sections, files, base_url, stylesheet);
        self.destination.render(template, &context).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use litdoc_core::HighlightError;
    use litdoc_core::highlight::reconcile::{HIGHLIGHT_END, HIGHLIGHT_START};
    use pretty_assertions::assert_eq;
    use std::fs;

    /// Wraps the payload unchanged; fails on payloads containing `boom`.
    #[derive(Clone)]
    struct PlainHighlighter;

    impl Highlighter for PlainHighlighter {
        async fn highlight(&self, language: &str, payload: String) -> Result<String, HighlightError> {
            if payload.contains("boom") {
                return Err(HighlightError::Process {
                    stderr: format!("{language} lexer exploded"),
                });
            }
            Ok(format!("{HIGHLIGHT_START}{payload}{HIGHLIGHT_END}\n"))
        }
    }

    fn config(target_dir: &Path) -> Config {
        let mut config = Config::default();
        config.output_resolved.target_dir = target_dir.to_path_buf();
        config
    }

    fn write(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[tokio::test]
    async fn test_build_directory() {
        let temp = tempfile::tempdir().unwrap();
        let src = temp.path().join("src");
        let docs = temp.path().join("docs");
        write(&src.join("main.py"), "# Entry point, see [util](file:lib/util.py)\nrun()\n");
        write(&src.join("lib/util.py"), "# Helpers\ndef run():\n    pass\n");

        let builder = SiteBuilder::new(&config(&docs), PlainHighlighter).unwrap();
        let report = builder.build(&[src]).await.unwrap();

        assert_eq!(report, BuildReport { compiled: 2, failed: 0 });
        assert!(report.is_success());
        assert!(docs.join("base.css").exists());

        let main = fs::read_to_string(docs.join("main.py.html")).unwrap();
        assert!(main.contains(r#"<a href="/lib/util.py.html">util</a>"#));
        assert!(main.contains("run()"));

        let util = fs::read_to_string(docs.join("lib/util.py.html")).unwrap();
        assert!(util.contains("<p>Helpers</p>"));
        assert!(util.contains("jump_page"));
    }

    #[tokio::test]
    async fn test_failing_file_does_not_abort_siblings() {
        let temp = tempfile::tempdir().unwrap();
        let src = temp.path().join("src");
        let docs = temp.path().join("docs");
        write(&src.join("good.rb"), "# fine\nputs 1\n");
        write(&src.join("bad.rb"), "# broken\nboom\n");

        let builder = SiteBuilder::new(&config(&docs), PlainHighlighter).unwrap();
        let report = builder.build(&[src]).await.unwrap();

        assert_eq!(report, BuildReport { compiled: 1, failed: 1 });
        assert!(docs.join("good.rb.html").exists());
        assert!(!docs.join("bad.rb.html").exists());
    }

    #[tokio::test]
    async fn test_file_target_uses_parent_as_base() {
        let temp = tempfile::tempdir().unwrap();
        let docs = temp.path().join("docs");
        let file = temp.path().join("pkg/app/server.js");
        write(&file, "// Server\nlisten();\n");

        let builder = SiteBuilder::new(&config(&docs), PlainHighlighter).unwrap();
        let report = builder.build(&[file]).await.unwrap();

        assert_eq!(report.compiled, 1);
        assert!(docs.join("server.js.html").exists());
    }

    #[tokio::test]
    async fn test_ignore_dirs_flattens_output() {
        let temp = tempfile::tempdir().unwrap();
        let docs = temp.path().join("docs");
        let pkg = temp.path().join("pkg");
        write(&pkg.join("app/server.js"), "// Server\nlisten();\n");

        let mut config = config(&docs);
        config.output_resolved.ignore_dirs = Some("app".to_owned());
        let builder = SiteBuilder::new(&config, PlainHighlighter).unwrap();
        let report = builder.build(&[pkg]).await.unwrap();

        assert_eq!(report.compiled, 1);
        assert!(docs.join("server.js.html").exists());
        assert!(!docs.join("app").exists());
    }

    #[tokio::test]
    async fn test_unsupported_file_target_fails() {
        let temp = tempfile::tempdir().unwrap();
        let docs = temp.path().join("docs");
        let file = temp.path().join("notes.txt");
        write(&file, "plain text\n");

        let builder = SiteBuilder::new(&config(&docs), PlainHighlighter).unwrap();
        let report = builder.build(&[file]).await.unwrap();

        assert_eq!(report, BuildReport { compiled: 0, failed: 1 });
    }

    #[tokio::test]
    async fn test_missing_target_is_counted() {
        let temp = tempfile::tempdir().unwrap();
        let docs = temp.path().join("docs");

        let builder = SiteBuilder::new(&config(&docs), PlainHighlighter).unwrap();
        let report = builder
            .build(&[temp.path().join("does-not-exist")])
            .await
            .unwrap();

        assert_eq!(report, BuildReport { compiled: 0, failed: 1 });
        assert!(docs.join("base.css").exists());
    }

    #[tokio::test]
    async fn test_custom_template_and_stylesheet() {
        let temp = tempfile::tempdir().unwrap();
        let src = temp.path().join("src");
        let docs = temp.path().join("docs");
        write(&src.join("a.lua"), "-- Lua\nprint(1)\n");
        write(&temp.path().join("page.html"), "{{ title }}|{{ stylesheet_url|safe }}");
        write(&temp.path().join("theme.css"), "body {}");

        let mut config = config(&docs);
        config.output_resolved.template = Some(temp.path().join("page.html"));
        config.output_resolved.stylesheet = Some(temp.path().join("theme.css"));
        config.output_resolved.base_url = "https://cdn.example.com/".to_owned();
        let builder = SiteBuilder::new(&config, PlainHighlighter).unwrap();
        builder.build(&[src]).await.unwrap();

        assert_eq!(
            fs::read_to_string(docs.join("a.lua.html")).unwrap(),
            "a.lua|https://cdn.example.com/theme.css"
        );
        assert_eq!(fs::read_to_string(docs.join("theme.css")).unwrap(), "body {}");
    }

    #[tokio::test]
    async fn test_no_recurse() {
        let temp = tempfile::tempdir().unwrap();
        let src = temp.path().join("src");
        let docs = temp.path().join("docs");
        write(&src.join("top.go"), "// top\npackage main\n");
        write(&src.join("sub/inner.go"), "// inner\npackage sub\n");

        let builder = SiteBuilder::new(&config(&docs), PlainHighlighter)
            .unwrap()
            .recurse(false);
        let report = builder.build(&[src]).await.unwrap();

        assert_eq!(report.compiled, 1);
        assert!(!docs.join("sub/inner.go.html").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinked_directory_is_compiled() {
        let temp = tempfile::tempdir().unwrap();
        let src = temp.path().join("src");
        let docs = temp.path().join("docs");
        write(&temp.path().join("vendor/lib.py"), "# Vendored\nx = 1\n");
        fs::create_dir_all(&src).unwrap();
        std::os::unix::fs::symlink(temp.path().join("vendor"), src.join("vendor")).unwrap();

        let builder = SiteBuilder::new(&config(&docs), PlainHighlighter).unwrap();
        let report = builder.build(&[src]).await.unwrap();

        assert_eq!(report, BuildReport { compiled: 1, failed: 0 });
        assert!(docs.join("vendor/lib.py.html").exists());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_build_on_current_thread_runtime() {
        let temp = tempfile::tempdir().unwrap();
        let src = temp.path().join("src");
        let docs = temp.path().join("docs");
        write(&src.join("a/b/c.py"), "# deep\npass\n");
        write(&src.join("d.py"), "# flat\npass\n");

        let builder = SiteBuilder::new(&config(&docs), PlainHighlighter).unwrap();
        let report = builder.build(&[src]).await.unwrap();

        assert_eq!(report, BuildReport { compiled: 2, failed: 0 });
    }
}
