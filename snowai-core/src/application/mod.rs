// snowai-core/src/application/mod.rs

pub mod env_check;
pub mod resolver;

use tracing::instrument;

use crate::domain::resolved::ResolvedConfig;
use crate::error::SnowaiError;
use crate::infrastructure::config::{ConfigDocument, ConfigOrigin, LoadOptions, discover, load_str};

// --- RE-EXPORTS (FACADE PATTERN) ---
pub use env_check::{EnvRequirement, check_env};
pub use resolver::resolve;

/// A resolved configuration together with where it was read from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub origin: ConfigOrigin,
    pub config: ResolvedConfig,
}

/// Discover, parse and resolve in one step.
#[instrument(skip(options))]
pub fn load_resolved(options: &LoadOptions) -> Result<LoadedConfig, SnowaiError> {
    let loaded = discover(options)?;
    let document = ConfigDocument::from_table(loaded.table)?;
    let config = resolve(&document)?;
    Ok(LoadedConfig {
        origin: loaded.origin,
        config,
    })
}

/// Resolves an in-memory TOML document.
pub fn resolve_str(text: &str) -> Result<ResolvedConfig, SnowaiError> {
    let document = ConfigDocument::from_table(load_str(text)?)?;
    Ok(resolve(&document)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::error::DomainError;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_resolved_from_custom_dir() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("app_config.toml"),
            "[apps.team.dashboard]\nname = \"Dashboard\"\n",
        )?;
        let options = LoadOptions {
            config_dir: Some(dir.path().to_path_buf()),
            current_dir: dir.path().to_path_buf(),
            ..LoadOptions::default()
        };

        let loaded = load_resolved(&options)?;

        assert_eq!(loaded.origin, ConfigOrigin::Directory(dir.path().to_path_buf()));
        assert_eq!(loaded.config.app("dashboard").unwrap().qualified_key, "team.dashboard");
        Ok(())
    }

    #[test]
    fn test_load_resolved_surfaces_domain_errors() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("app_config.toml"),
            "[apps.team.dashboard]\nname = \"D\"\napp_connects = [\"data_connects.nope\"]\n",
        )?;
        let options = LoadOptions {
            config_dir: Some(dir.path().to_path_buf()),
            current_dir: dir.path().to_path_buf(),
            ..LoadOptions::default()
        };

        match load_resolved(&options).unwrap_err() {
            SnowaiError::Domain(DomainError::ConfigReference { path, .. }) => {
                assert_eq!(path, "data_connects.nope");
            }
            other => panic!("Expected a reference error, got {other:?}"),
        }
        Ok(())
    }
}
