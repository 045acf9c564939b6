//! `litdoc languages` command implementation.

use std::path::PathBuf;

use clap::Args;
use litdoc_config::{CliSettings, Config};
use litdoc_core::ExtensionMap;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the languages command.
#[derive(Args)]
pub(crate) struct LanguagesArgs {
    /// Extension JSON file, providing support for other languages.
    #[arg(short = 'X', long)]
    extensions: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover litdoc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl LanguagesArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            extensions_file: self.extensions,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        if let Some(path) = &config.config_path {
            output.status("Config", &path.display().to_string());
        }
        for line in format_table(&config.extensions_resolved) {
            output.line(&line);
        }
        output.finished(&format!(
            "{} extension(s)",
            config.extensions_resolved.len()
        ));
        Ok(())
    }
}

/// One aligned `extension  language  symbol` line per entry.
fn format_table(extensions: &ExtensionMap) -> Vec<String> {
    let ext_width = extensions.iter().map(|(ext, _)| ext.len()).max().unwrap_or(0);
    let lang_width = extensions
        .iter()
        .map(|(_, meta)| meta.language.len())
        .max()
        .unwrap_or(0);

    extensions
        .iter()
        .map(|(ext, meta)| {
            format!(
                "{ext:<ext_width$}  {:<lang_width$}  {}",
                meta.language, meta.symbol
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use litdoc_core::LanguageMeta;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_table_aligns_columns() {
        let extensions: ExtensionMap = [
            (".py".to_owned(), LanguageMeta::new("python", "#")),
            (".lua".to_owned(), LanguageMeta::new("lua", "--")),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            format_table(&extensions),
            vec![".lua  lua     --", ".py   python  #"]
        );
    }

    #[test]
    fn test_format_table_empty() {
        assert!(format_table(&ExtensionMap::new()).is_empty());
    }
}
