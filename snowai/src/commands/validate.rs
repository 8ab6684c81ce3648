// snowai/src/commands/validate.rs
//
// USE CASE: Load + resolve, report a summary or the first error.

use crate::cli::ConfigSource;
use crate::commands::load;

pub fn execute(source: &ConfigSource) -> anyhow::Result<()> {
    println!("⚙️  Loading configuration...");
    let loaded = load(source)?;
    let config = &loaded.config;

    println!("   Source: {}", loaded.origin);
    println!("   Apps: {}", config.apps.len());
    println!(
        "   App connects: {} OAuth, {} data",
        config.oauth_connects.len(),
        config.data_connects.len()
    );
    println!(
        "   ML ops: {} pipeline flows, {} model registries, {} feature stores",
        config.pipeline_flows.len(),
        config.model_registries.len(),
        config.feature_stores.len()
    );
    if !config.oauth_init_list.is_empty() {
        println!("   OAuth init list: [{}]", config.oauth_init_list.join(", "));
    }

    println!("✅ Configuration is valid ({} entries resolved)", config.entry_count());
    Ok(())
}
