// snowai/src/commands/mod.rs

pub mod check_env;
pub mod init;
pub mod list;
pub mod show;
pub mod validate;

use std::sync::Arc;
use tracing::debug;

use snowai_core::domain::AppDescriptor;
use snowai_core::{LoadOptions, LoadedConfig, ResolvedConfig, load_resolved};

use crate::cli::ConfigSource;

/// Loads and resolves the configuration, or prints the diagnostic and exits.
pub fn load(source: &ConfigSource) -> anyhow::Result<LoadedConfig> {
    let options = LoadOptions::from_env()?
        .with_overrides(source.config_dir.clone(), source.config_file.clone());
    debug!(?options, "Configuration lookup");

    match load_resolved(&options) {
        Ok(loaded) => Ok(loaded),
        Err(e) => {
            eprintln!("❌ Configuration is invalid");
            eprintln!("{:?}", miette::Report::new(e));
            std::process::exit(1);
        }
    }
}

pub fn find_app<'a>(config: &'a ResolvedConfig, key: &str) -> anyhow::Result<&'a Arc<AppDescriptor>> {
    config.app(key).ok_or_else(|| {
        let known: Vec<&str> = config.apps.keys().map(String::as_str).collect();
        anyhow::anyhow!(
            "❌ App '{}' not found.\n👉 Known apps: {}",
            key,
            known.join(", ")
        )
    })
}
