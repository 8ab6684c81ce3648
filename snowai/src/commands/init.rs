// snowai/src/commands/init.rs
//
// USE CASE: Scaffold the bundled default configuration.

use std::path::PathBuf;

use snowai_core::infrastructure::config::BUNDLED_DOCUMENT;
use snowai_core::infrastructure::config::loader::DEFAULT_CONFIG_FILE;
use snowai_core::infrastructure::fs::{WriteMode, atomic_write};

pub fn execute(dir: PathBuf, force: bool) -> anyhow::Result<()> {
    let target = dir.join(DEFAULT_CONFIG_FILE);

    if target.exists() && !force {
        anyhow::bail!(
            "❌ {} already exists.\n👉 Use --force to overwrite it.",
            target.display()
        );
    }

    let mode = if force {
        WriteMode::Overwrite
    } else {
        WriteMode::CreateNew
    };
    atomic_write(&target, BUNDLED_DOCUMENT, mode)?;

    println!("✨ Wrote default configuration to {}", target.display());
    println!("👉 Edit it, then run 'snowai validate --config-dir {}'", dir.display());
    Ok(())
}
