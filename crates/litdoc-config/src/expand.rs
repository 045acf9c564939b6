//! `${NAME}` and `${NAME:-fallback}` references in configuration values.

use std::borrow::Cow;
use std::env::{self, VarError};

use shellexpand::LookupError;

use crate::ConfigError;

/// Substitute environment references in the value of config key `field`.
///
/// Values without a `${` are returned as-is, so a command such as
/// `$HOME/bin/pygmentize` is left for the shell that never sees it.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, lookup)
        .map(Cow::into_owned)
        .map_err(|err| unresolved(field, &err))
}

fn lookup(name: &str) -> Result<Option<String>, VarError> {
    env::var(name).map(Some)
}

fn unresolved(field: &str, err: &LookupError<VarError>) -> ConfigError {
    let name = &err.var_name;
    let message = match err.cause {
        VarError::NotPresent => format!("${{{name}}} not set"),
        VarError::NotUnicode(_) => format!("${{{name}}} is not valid unicode"),
    };
    ConfigError::EnvVar {
        field: field.to_owned(),
        message,
    }
}
