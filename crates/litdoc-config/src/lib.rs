//! Configuration management for litdoc.
//!
//! Parses `litdoc.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Extension map
//!
//! The language table is built in layers, later layers overriding earlier ones:
//!
//! 1. built-in languages ([`ExtensionMap::builtin`])
//! 2. `extensions.extensions_file` (JSON map of extension to `{language, symbol}`)
//! 3. inline `[extensions]` entries
//! 4. the `--extensions` JSON file given on the command line
//!
//! ## Environment Variable Expansion
//!
//! `output.base_url` and `highlighter.command` support `${VAR}` and
//! `${VAR:-default}`.

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use litdoc_core::highlight::{DEFAULT_ARGS, DEFAULT_PROGRAM, DEFAULT_TIMEOUT};
use litdoc_core::{ExtensionMap, LanguageMeta};
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override output directory.
    pub target_dir: Option<PathBuf>,
    /// Override base URL for stylesheet links.
    pub base_url: Option<String>,
    /// Override the path fragment dropped from output paths.
    pub ignore_dirs: Option<String>,
    /// Override stylesheet file.
    pub stylesheet: Option<PathBuf>,
    /// Override page template file.
    pub template: Option<PathBuf>,
    /// Extra extension JSON file, applied on top of everything else.
    pub extensions_file: Option<PathBuf>,
    /// Override highlighter program.
    pub highlighter: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "litdoc.toml";

/// Default output directory name.
const DEFAULT_TARGET_DIR: &str = "docs";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output configuration (paths are relative strings from TOML).
    output: OutputConfigRaw,
    /// Highlighter process configuration.
    pub highlighter: HighlighterConfig,
    /// Extension table overrides.
    extensions: ExtensionsConfigRaw,

    /// Resolved output configuration (set after loading).
    #[serde(skip)]
    pub output_resolved: OutputConfig,
    /// Resolved extension map (set after loading).
    #[serde(skip)]
    pub extensions_resolved: ExtensionMap,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw output configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputConfigRaw {
    target_dir: Option<String>,
    base_url: Option<String>,
    ignore_dirs: Option<String>,
    stylesheet: Option<String>,
    template: Option<String>,
}

/// Resolved output configuration with absolute paths.
#[derive(Debug, Default, Clone)]
pub struct OutputConfig {
    /// Directory generated pages are written to.
    pub target_dir: PathBuf,
    /// Prefix for stylesheet links in pages.
    pub base_url: String,
    /// Path fragment removed from output paths.
    pub ignore_dirs: Option<String>,
    /// Custom stylesheet (built-in stylesheet when `None`).
    pub stylesheet: Option<PathBuf>,
    /// Custom page template (built-in template when `None`).
    pub template: Option<PathBuf>,
}

/// Highlighter process configuration.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HighlighterConfig {
    /// Program to run.
    pub command: String,
    /// Program arguments; `{language}` is replaced with the grammar name.
    pub args: Vec<String>,
    /// Seconds allowed per invocation, 0 disables the limit.
    pub timeout_secs: u64,
}

impl Default for HighlighterConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_PROGRAM.to_owned(),
            args: DEFAULT_ARGS.iter().map(|&arg| arg.to_owned()).collect(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl HighlighterConfig {
    /// Invocation time limit, `None` when disabled.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Raw `[extensions]` table.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ExtensionsConfigRaw {
    extensions_file: Option<String>,
    #[serde(flatten)]
    entries: BTreeMap<String, LanguageMeta>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Extension JSON file error.
    #[error("Invalid extensions file {}: {source}", .path.display())]
    Extensions {
        /// Path of the JSON file.
        path: PathBuf,
        /// Parse error.
        #[source]
        source: serde_json::Error,
    },
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`output.base_url`").
        field: String,
        /// Error message (e.g., "${`DOCS_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Load an extension map from a JSON file.
///
/// The file maps extensions to `{ "language": ..., "symbol": ... }`.
pub fn load_extensions_file(path: &Path) -> Result<ExtensionMap, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let entries: BTreeMap<String, LanguageMeta> =
        serde_json::from_str(&content).map_err(|source| ConfigError::Extensions {
            path: path.to_path_buf(),
            source,
        })?;
    let map = entries.into_iter().collect();
    validate_extensions(&map)?;
    Ok(map)
}

/// Check that every entry has a usable grammar name and comment symbol.
fn validate_extensions(map: &ExtensionMap) -> Result<(), ConfigError> {
    for (ext, meta) in map.iter() {
        require_non_empty(&meta.language, &format!("extensions.\"{ext}\".language"))?;
        require_non_empty(&meta.symbol, &format!("extensions.\"{ext}\".symbol"))?;
        if meta.symbol.contains('\n') {
            return Err(ConfigError::Validation(format!(
                "extensions.\"{ext}\".symbol cannot contain a newline"
            )));
        }
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `litdoc.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            if let Some(file) = &settings.extensions_file {
                config.extensions_resolved.extend(load_extensions_file(file)?);
            }
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(target_dir) = &settings.target_dir {
            self.output_resolved.target_dir.clone_from(target_dir);
        }
        if let Some(base_url) = &settings.base_url {
            self.output_resolved.base_url.clone_from(base_url);
        }
        if let Some(ignore_dirs) = &settings.ignore_dirs {
            self.output_resolved.ignore_dirs = Some(ignore_dirs.clone());
        }
        if let Some(stylesheet) = &settings.stylesheet {
            self.output_resolved.stylesheet = Some(stylesheet.clone());
        }
        if let Some(template) = &settings.template {
            self.output_resolved.template = Some(template.clone());
        }
        if let Some(highlighter) = &settings.highlighter {
            self.highlighter.command.clone_from(highlighter);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            output: OutputConfigRaw::default(),
            highlighter: HighlighterConfig::default(),
            extensions: ExtensionsConfigRaw::default(),
            output_resolved: OutputConfig {
                target_dir: base.join(DEFAULT_TARGET_DIR),
                ..OutputConfig::default()
            },
            extensions_resolved: ExtensionMap::builtin(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.highlighter.command, "highlighter.command")?;
        validate_extensions(&self.extensions_resolved)?;
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.highlighter.command =
            expand::expand_env(&self.highlighter.command, "highlighter.command")?;

        if let Some(ref url) = self.output.base_url {
            self.output.base_url = Some(expand::expand_env(url, "output.base_url")?);
        }

        Ok(())
    }

    /// Resolve relative paths against the config directory and build the
    /// extension map.
    fn resolve_paths(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        let resolve = |path: &Option<String>| path.as_ref().map(|p| config_dir.join(p));

        self.output_resolved = OutputConfig {
            target_dir: config_dir.join(
                self.output
                    .target_dir
                    .as_deref()
                    .unwrap_or(DEFAULT_TARGET_DIR),
            ),
            base_url: self.output.base_url.clone().unwrap_or_default(),
            ignore_dirs: self.output.ignore_dirs.clone().filter(|d| !d.is_empty()),
            stylesheet: resolve(&self.output.stylesheet),
            template: resolve(&self.output.template),
        };

        let mut extensions = ExtensionMap::builtin();
        if let Some(file) = resolve(&self.extensions.extensions_file) {
            extensions.extend(load_extensions_file(&file)?);
        }
        extensions.extend(
            std::mem::take(&mut self.extensions.entries)
                .into_iter()
                .collect(),
        );
        self.extensions_resolved = extensions;

        Ok(())
    }
}
