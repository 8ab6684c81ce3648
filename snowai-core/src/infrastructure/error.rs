// snowai-core/src/infrastructure/error.rs

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(snowai::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- CONFIG / TOML ---
    #[error("TOML Parsing Error in {path:?}: {source}")]
    #[diagnostic(
        code(snowai::infra::toml),
        help("Check your TOML syntax (quotes, table headers, duplicate keys).")
    )]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Configuration not found at '{0}'")]
    #[diagnostic(
        code(snowai::infra::config_missing),
        help("Pass an existing directory with --config-dir, or run `snowai init`.")
    )]
    ConfigNotFound(String),
}
