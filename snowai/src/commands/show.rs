// snowai/src/commands/show.rs
//
// USE CASE: Display one resolved app, references replaced by their targets.

use snowai_core::domain::{AppDescriptor, ConnectDescriptor, DataConnectKind, SnowflakeAuth};

use crate::cli::{ConfigSource, OutputFormat};
use crate::commands::{find_app, load};

pub fn execute(source: &ConfigSource, app_key: &str, format: OutputFormat) -> anyhow::Result<()> {
    let loaded = load(source)?;
    let app = find_app(&loaded.config, app_key)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(app)?),
        OutputFormat::Text => print_text(app),
    }
    Ok(())
}

fn print_text(app: &AppDescriptor) {
    println!("🔎 {} ({})", app.qualified_key, app.app_type);
    println!("   Name: {}", app.name);
    println!("   Short name: {}", app.app_short_name);
    if let Some(version) = &app.version {
        println!("   Version: {}", version);
    }
    if let Some(env) = &app.domain_env {
        println!("   Environment: {}", env);
    }
    println!("   App dir: {}", app.app_dir().display());
    println!("   Script dir: {}", app.script_dir().display());
    for (name, value) in &app.group_attributes {
        println!("   [{}] {}: {}", app.group, name, value);
    }

    println!("\n   Connects:");
    if app.connects.is_empty() {
        println!("     (none)");
    }
    for connect in &app.connects {
        println!("     ➜ {}", describe_connect(connect));
    }

    if !app.ml_ops.is_empty() {
        println!("\n   Pipeline flows:");
        for flow in &app.ml_ops {
            let steps: Vec<&str> = flow.step_tasks.iter().map(|s| s.as_str()).collect();
            println!(
                "     ➜ {} [{}] on {}: {}",
                flow.key,
                flow.execution_mode,
                flow.data_connect.key,
                steps.join(" → ")
            );
            if let Some(registry) = &flow.model_registry {
                println!("       model registry: {} ({})", registry.key, registry.registry_table);
            }
            if let Some(store) = &flow.feature_store {
                println!("       feature store: {}", store.key);
            }
        }
    }

    let env_vars = app.required_env_vars();
    if !env_vars.is_empty() {
        println!("\n   Environment variables: {}", env_vars.join(", "));
    }
}

fn describe_connect(connect: &ConnectDescriptor) -> String {
    let group = connect.group();
    match connect {
        ConnectDescriptor::OAuth(oauth) => format!(
            "{group}.{} ({}, {})",
            oauth.key,
            oauth.auth_type,
            oauth.flow.map(|f| f.to_string()).unwrap_or_else(|| "-".into())
        ),
        ConnectDescriptor::Data(data) => match &data.kind {
            DataConnectKind::Snowflake(sf) => {
                let via = match &sf.auth {
                    SnowflakeAuth::OAuth { oauth_connect } => {
                        format!(" via oauth_connects.{}", oauth_connect.key)
                    }
                    _ => String::new(),
                };
                format!(
                    "{group}.{} (snowflake, {}) {}/{}.{} as {}{}",
                    data.key,
                    sf.auth.as_str(),
                    sf.account,
                    sf.database,
                    sf.schema,
                    sf.role,
                    via
                )
            }
            DataConnectKind::File(file) => format!(
                "{group}.{} (file, {}) {}",
                data.key,
                file.storage_type.as_str(),
                file.path().display()
            ),
        },
    }
}
