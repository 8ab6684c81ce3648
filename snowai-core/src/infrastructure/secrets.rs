// snowai-core/src/infrastructure/secrets.rs

use std::collections::BTreeMap;

use crate::ports::secrets::SecretSource;

/// Reads secrets from the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecretSource;

impl SecretSource for EnvSecretSource {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Fixed name/value pairs, for tests and embedding callers.
#[derive(Debug, Default, Clone)]
pub struct StaticSecretSource {
    values: BTreeMap<String, String>,
}

impl StaticSecretSource {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl SecretSource for StaticSecretSource {
    fn lookup(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_value_counts_as_unset() {
        let source = StaticSecretSource::new([("SNOWSQL_PWD", ""), ("SNOWFLAKE_DEFAULT_APP_SECRET", "s3cr3t")]);
        assert!(!source.is_set("SNOWSQL_PWD"));
        assert!(source.is_set("SNOWFLAKE_DEFAULT_APP_SECRET"));
        assert!(!source.is_set("MISSING"));
    }

    #[test]
    fn test_env_source_reads_process_env() {
        // PATH is set in any test environment.
        assert!(EnvSecretSource.lookup("PATH").is_some());
        assert!(EnvSecretSource.lookup("SNOWAI_SURELY_UNSET_VARIABLE_42").is_none());
    }
}
