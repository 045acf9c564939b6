//! CLI error types.

use litdoc_config::ConfigError;
use litdoc_site::SiteError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Site(#[from] SiteError),

    #[error("{failed} file(s) failed to compile, {compiled} compiled")]
    Failed { failed: usize, compiled: usize },
}
