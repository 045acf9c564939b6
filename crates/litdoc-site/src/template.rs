//! Page template and stylesheet.
//!
//! Pages are rendered with `minijinja`. The template receives:
//!
//! - `title`: page title (the source file name)
//! - `file`: `{ path, filename, url }` of the page's source file
//! - `sections`: `[{ doc, code }]`, both already HTML (`doc` may be none)
//! - `files`: every discovered file, for navigation
//! - `base_url`, `stylesheet_url`
//!
//! The template is registered as `page.html`, so output is auto-escaped and
//! section HTML must be passed through `|safe`.

use std::borrow::Cow;
use std::path::Path;

use litdoc_core::RenderedSection;
use minijinja::Environment;
use serde::Serialize;

use crate::SiteError;
use crate::registry::FileEntry;

const TEMPLATE_NAME: &str = "page.html";
const DEFAULT_TEMPLATE: &str = include_str!("../assets/default.html");
const DEFAULT_STYLESHEET: &str = include_str!("../assets/base.css");
const DEFAULT_STYLESHEET_NAME: &str = "base.css";

/// Compiled page template.
pub struct PageTemplate {
    env: Environment<'static>,
}

impl std::fmt::Debug for PageTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageTemplate").finish_non_exhaustive()
    }
}

impl PageTemplate {
    /// The built-in template.
    pub fn builtin() -> Result<Self, SiteError> {
        let mut env = Environment::new();
        env.add_template(TEMPLATE_NAME, DEFAULT_TEMPLATE)?;
        Ok(Self { env })
    }

    /// Compile a template from source text.
    pub fn from_source(source: impl Into<String>) -> Result<Self, SiteError> {
        let mut env = Environment::new();
        env.add_template_owned(TEMPLATE_NAME, source.into())?;
        Ok(Self { env })
    }

    /// Load and compile a template file.
    pub fn from_file(path: &Path) -> Result<Self, SiteError> {
        Self::from_source(std::fs::read_to_string(path)?)
    }

    /// Template from `path`, or the built-in one.
    pub fn load(path: Option<&Path>) -> Result<Self, SiteError> {
        path.map_or_else(Self::builtin, Self::from_file)
    }

    /// Render a page.
    pub fn render(&self, context: &PageContext<'_>) -> Result<String, SiteError> {
        Ok(self.env.get_template(TEMPLATE_NAME)?.render(context)?)
    }
}

/// Template context for one page.
#[derive(Debug, Serialize)]
pub struct PageContext<'a> {
    pub title: &'a str,
    pub file: &'a FileEntry,
    pub sections: &'a [RenderedSection],
    pub files: &'a [FileEntry],
    pub base_url: &'a str,
    pub stylesheet_url: String,
}

impl<'a> PageContext<'a> {
    pub fn new(
        file: &'a FileEntry,
        sections: &'a [RenderedSection],
        files: &'a [FileEntry],
        base_url: &'a str,
        stylesheet: &str,
    ) -> Self {
        Self {
            title: &file.filename,
            file,
            sections,
            files,
            base_url,
            stylesheet_url: format!("{}/{stylesheet}", base_url.trim_end_matches('/')),
        }
    }
}

/// Stylesheet written next to the generated pages.
#[derive(Debug, Clone)]
pub struct Stylesheet {
    name: String,
    contents: Cow<'static, str>,
}

impl Stylesheet {
    /// The built-in stylesheet, `base.css`.
    pub fn builtin() -> Self {
        Self {
            name: DEFAULT_STYLESHEET_NAME.to_owned(),
            contents: Cow::Borrowed(DEFAULT_STYLESHEET),
        }
    }

    /// Read a stylesheet file. It keeps its file name in the output.
    pub fn from_file(path: &Path) -> Result<Self, SiteError> {
        let contents = std::fs::read_to_string(path)?;
        let name = path.file_name().map_or_else(
            || DEFAULT_STYLESHEET_NAME.to_owned(),
            |name| name.to_string_lossy().into_owned(),
        );
        Ok(Self {
            name,
            contents: Cow::Owned(contents),
        })
    }

    /// Stylesheet from `path`, or the built-in one.
    pub fn load(path: Option<&Path>) -> Result<Self, SiteError> {
        path.map_or_else(|| Ok(Self::builtin()), Self::from_file)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }
}
