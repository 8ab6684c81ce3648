// snowai/src/commands/check_env.rs
//
// USE CASE: Pre-flight check of the environment variables an app relies on.
// Only names and presence are printed, never values.

use snowai_core::application::env_check::{check_env, missing};
use snowai_core::infrastructure::EnvSecretSource;

use crate::cli::ConfigSource;
use crate::commands::{find_app, load};

pub fn execute(source: &ConfigSource, app_key: &str, strict: bool) -> anyhow::Result<()> {
    let loaded = load(source)?;
    let app = find_app(&loaded.config, app_key)?;

    println!("🔑 Environment for {}", app.qualified_key);

    let report = check_env(app, &EnvSecretSource);
    if report.is_empty() {
        println!("   No environment variables required.");
        return Ok(());
    }

    for requirement in &report {
        let status = if requirement.is_set { "✅ set" } else { "❌ missing" };
        println!("   {:<45} {}", requirement.name, status);
    }

    let unset: Vec<&str> = missing(&report).collect();
    if unset.is_empty() {
        println!("✨ All {} variable(s) set.", report.len());
    } else {
        eprintln!("\n⚠️  {} variable(s) missing: {}", unset.len(), unset.join(", "));
        if strict {
            eprintln!("💥 --strict mode: Failing due to missing variables.");
            std::process::exit(1);
        }
    }

    Ok(())
}
