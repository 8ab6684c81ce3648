// snowai-core/src/application/env_check.rs

use serde::Serialize;
use tracing::{debug, instrument};

use crate::domain::app::AppDescriptor;
use crate::ports::secrets::SecretSource;

/// Whether one environment variable an app depends on is bound.
/// The value itself is never captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvRequirement {
    pub name: String,
    pub is_set: bool,
}

#[instrument(skip(app, source), fields(app = %app.qualified_key))]
pub fn check_env(app: &AppDescriptor, source: &dyn SecretSource) -> Vec<EnvRequirement> {
    app.required_env_vars()
        .into_iter()
        .map(|name| {
            let is_set = source.is_set(name);
            debug!(name, is_set, "Checked environment variable");
            EnvRequirement {
                name: name.to_string(),
                is_set,
            }
        })
        .collect()
}

pub fn missing(requirements: &[EnvRequirement]) -> impl Iterator<Item = &str> {
    requirements
        .iter()
        .filter(|r| !r.is_set)
        .map(|r| r.name.as_str())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::resolve_str;
    use crate::infrastructure::config::loader::BUNDLED_DOCUMENT;
    use crate::infrastructure::secrets::StaticSecretSource;
    use anyhow::Result;

    #[test]
    fn test_check_env_reports_names_only() -> Result<()> {
        let config = resolve_str(BUNDLED_DOCUMENT)?;
        let app = config.app("group0.app2").unwrap();
        let source = StaticSecretSource::new([("SNOWFLAKE_USER_PRIVATE_KEY_PATH", "/keys/rsa.p8")]);

        let report = check_env(app, &source);

        assert_eq!(
            report,
            vec![
                EnvRequirement {
                    name: "SNOWFLAKE_USER_PRIVATE_KEY_PASSPHRASE".into(),
                    is_set: false
                },
                EnvRequirement {
                    name: "SNOWFLAKE_USER_PRIVATE_KEY_PATH".into(),
                    is_set: true
                },
            ]
        );
        assert_eq!(
            missing(&report).collect::<Vec<_>>(),
            vec!["SNOWFLAKE_USER_PRIVATE_KEY_PASSPHRASE"]
        );
        Ok(())
    }

    #[test]
    fn test_check_env_deduplicates_across_connects_and_flows() -> Result<()> {
        let config = resolve_str(BUNDLED_DOCUMENT)?;
        // app1 reaches the keypair connect both through its flow and the flow's registry/store.
        let app = config.app("group0.app1").unwrap();
        let names: Vec<String> = check_env(app, &StaticSecretSource::default())
            .into_iter()
            .map(|r| r.name)
            .collect();

        assert_eq!(
            names,
            vec![
                "SNOWFLAKE_DEFAULT_APP_SECRET",
                "SNOWFLAKE_USER_PRIVATE_KEY_PASSPHRASE",
                "SNOWFLAKE_USER_PRIVATE_KEY_PATH"
            ]
        );
        Ok(())
    }
}
