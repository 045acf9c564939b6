//! `litdoc build` command implementation.

use std::path::PathBuf;

use clap::Args;
use litdoc_config::{CliSettings, Config};
use litdoc_core::ProcessHighlighter;
use litdoc_site::SiteBuilder;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Files and directories to generate documentation from.
    #[arg(required = true)]
    targets: Vec<PathBuf>,

    /// Set the output directory (overrides config).
    #[arg(short = 'O', long)]
    target_dir: Option<PathBuf>,

    /// Base URL for serving stylesheets.
    #[arg(short = 'u', long = "url")]
    base_url: Option<String>,

    /// Use a custom stylesheet.
    #[arg(long = "css")]
    stylesheet: Option<PathBuf>,

    /// Jinja-style template file to use when generating docs.
    #[arg(short = 'T', long)]
    template: Option<PathBuf>,

    /// Extension JSON file, providing support for other languages.
    #[arg(short = 'X', long)]
    extensions: Option<PathBuf>,

    /// Portion of the source path to drop from output paths.
    #[arg(short = 'I', long)]
    ignore_dirs: Option<String>,

    /// Highlighter program (overrides config).
    #[arg(long, env = "LITDOC_HIGHLIGHTER")]
    highlighter: Option<String>,

    /// Do not descend into subdirectories.
    #[arg(long)]
    no_recurse: bool,

    /// Path to configuration file (default: auto-discover litdoc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output (log every visited file and directory).
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the stylesheet cannot be
    /// written, or any file fails to compile.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            target_dir: self.target_dir,
            base_url: self.base_url,
            ignore_dirs: self.ignore_dirs,
            stylesheet: self.stylesheet,
            template: self.template,
            extensions_file: self.extensions,
            highlighter: self.highlighter,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::debug!(path = %path.display(), "Loaded configuration");
        }

        let target_dir = config.output_resolved.target_dir.clone();
        output.status("Output", &target_dir.display().to_string());

        let highlighter =
            ProcessHighlighter::new(&config.highlighter.command, config.highlighter.args.clone())
                .timeout(config.highlighter.timeout());
        let builder = SiteBuilder::new(&config, highlighter)?.recurse(!self.no_recurse);

        let report = builder.build(&self.targets).await?;

        if !report.is_success() {
            return Err(CliError::Failed {
                failed: report.failed,
                compiled: report.compiled,
            });
        }

        output.finished(&format!("{} page(s)", report.compiled));
        Ok(())
    }
}
