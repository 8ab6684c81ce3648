// snowai/src/commands/list.rs
//
// USE CASE: Tabular overview of the resolved configuration.

use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};

use snowai_core::ResolvedConfig;

use crate::cli::ConfigSource;
use crate::commands::load;

pub fn execute(source: &ConfigSource) -> anyhow::Result<()> {
    let loaded = load(source)?;
    let config = &loaded.config;

    println!("📋 Configuration from {}", loaded.origin);

    println!("\nApps");
    println!("{}", apps_table(config));

    println!("\nApp connects");
    println!("{}", connects_table(config));

    if !config.pipeline_flows.is_empty() {
        println!("\nPipeline flows");
        println!("{}", flows_table(config));
    }

    Ok(())
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(headers.iter().map(|h| Cell::new(h).fg(Color::Cyan)));
    table
}

fn apps_table(config: &ResolvedConfig) -> Table {
    let mut table = new_table(&["App", "Type", "Name", "Connects", "ML ops"]);
    for app in config.apps.values() {
        let connects: Vec<&str> = app.connects.iter().map(|c| c.key()).collect();
        let flows: Vec<&str> = app.ml_ops.iter().map(|f| f.key.as_str()).collect();
        table.add_row(vec![
            app.qualified_key.clone(),
            app.app_type.to_string(),
            app.name.clone(),
            connects.join("\n"),
            flows.join("\n"),
        ]);
    }
    table
}

fn connects_table(config: &ResolvedConfig) -> Table {
    let mut table = new_table(&["Section", "Key", "Kind", "Auth"]);
    for (key, oauth) in &config.oauth_connects {
        table.add_row(vec![
            "oauth_connects".to_string(),
            key.clone(),
            oauth.flow.map(|f| f.to_string()).unwrap_or_default(),
            oauth.auth_type.to_string(),
        ]);
    }
    for (key, data) in &config.data_connects {
        table.add_row(vec![
            "data_connects".to_string(),
            key.clone(),
            data.type_str().to_string(),
            data.auth_type_str().unwrap_or("-").to_string(),
        ]);
    }
    table
}

fn flows_table(config: &ResolvedConfig) -> Table {
    let mut table = new_table(&["Flow", "Data connect", "Mode", "Steps"]);
    for (key, flow) in &config.pipeline_flows {
        let steps: Vec<&str> = flow.step_tasks.iter().map(|s| s.as_str()).collect();
        table.add_row(vec![
            key.clone(),
            flow.data_connect.key.clone(),
            flow.execution_mode.to_string(),
            steps.join(" → "),
        ]);
    }
    table
}
