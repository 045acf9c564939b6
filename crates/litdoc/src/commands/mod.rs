//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod languages;

pub(crate) use build::BuildArgs;
pub(crate) use languages::LanguagesArgs;
