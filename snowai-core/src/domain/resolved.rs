// snowai-core/src/domain/resolved.rs

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::app::AppDescriptor;
use crate::domain::connect::{DataConnectDescriptor, OAuthDescriptor};
use crate::domain::mlops::{FeatureStoreDescriptor, ModelRegistryDescriptor, PipelineFlowDescriptor};
use crate::domain::reference::{default_key, split_group_key};

/// The outcome of one load: every section fully resolved, owned by the caller.
///
/// Nothing here is global. Two loads of the same document compare equal.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResolvedConfig {
    /// Keyed by qualified key (`group.app`).
    pub apps: BTreeMap<String, Arc<AppDescriptor>>,
    /// Scalar attributes of each `[apps.<group>]` table, keyed by group.
    pub app_groups: BTreeMap<String, BTreeMap<String, String>>,
    pub oauth_connects: BTreeMap<String, Arc<OAuthDescriptor>>,
    /// `[app_connects.oauth_connects].init_list`, in document order.
    pub oauth_init_list: Vec<String>,
    pub data_connects: BTreeMap<String, Arc<DataConnectDescriptor>>,
    pub pipeline_flows: BTreeMap<String, Arc<PipelineFlowDescriptor>>,
    pub model_registries: BTreeMap<String, Arc<ModelRegistryDescriptor>>,
    pub feature_stores: BTreeMap<String, Arc<FeatureStoreDescriptor>>,
}

impl ResolvedConfig {
    /// Looks up an app by `group.app`, or by bare `app`.
    ///
    /// A bare key is searched across groups in sorted order. The last group whose
    /// name contains `default` wins, otherwise the first match.
    pub fn app(&self, key: &str) -> Option<&Arc<AppDescriptor>> {
        let (group, app) = split_group_key(key);
        if !group.is_empty() {
            return self.apps.get(&format!("{group}.{app}"));
        }

        let mut first_match = None;
        let mut default_match = None;
        for descriptor in self.apps.values() {
            if descriptor.qualified_key != format!("{}.{}", descriptor.group, app) {
                continue;
            }
            if descriptor.group.contains("default") {
                default_match = Some(descriptor);
            }
            if first_match.is_none() {
                first_match = Some(descriptor);
            }
        }
        default_match.or(first_match)
    }

    pub fn group_attributes(&self, group: &str) -> Option<&BTreeMap<String, String>> {
        self.app_groups.get(&group.trim().to_lowercase())
    }

    pub fn default_oauth_connect(&self) -> Option<&Arc<OAuthDescriptor>> {
        default_key(self.oauth_connects.keys().map(String::as_str))
            .and_then(|key| self.oauth_connects.get(key))
    }

    pub fn default_data_connect(&self) -> Option<&Arc<DataConnectDescriptor>> {
        default_key(self.data_connects.keys().map(String::as_str))
            .and_then(|key| self.data_connects.get(key))
    }

    pub fn oauth_connect(&self, key: &str) -> Option<&Arc<OAuthDescriptor>> {
        self.oauth_connects.get(&key.trim().to_lowercase())
    }

    pub fn data_connect(&self, key: &str) -> Option<&Arc<DataConnectDescriptor>> {
        self.data_connects.get(&key.trim().to_lowercase())
    }

    pub fn pipeline_flow(&self, key: &str) -> Option<&Arc<PipelineFlowDescriptor>> {
        self.pipeline_flows.get(&key.trim().to_lowercase())
    }

    /// OAuth descriptors to initialize eagerly, in `init_list` order.
    pub fn init_oauth_connects(&self) -> impl Iterator<Item = &Arc<OAuthDescriptor>> {
        self.oauth_init_list
            .iter()
            .filter_map(|key| self.oauth_connects.get(key))
    }

    pub fn entry_count(&self) -> usize {
        self.apps.len()
            + self.oauth_connects.len()
            + self.data_connects.len()
            + self.pipeline_flows.len()
            + self.model_registries.len()
            + self.feature_stores.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::app::AppType;

    fn app(group: &str, name: &str) -> Arc<AppDescriptor> {
        Arc::new(AppDescriptor {
            qualified_key: format!("{group}.{name}"),
            group: group.into(),
            app_short_name: format!("{group}_{name}"),
            app_type: AppType::Streamlit,
            name: name.into(),
            version: None,
            domain_env: None,
            app_path: ".".into(),
            script_home: ".".into(),
            root_path: ".".into(),
            group_attributes: BTreeMap::new(),
            connects: vec![],
            ml_ops: vec![],
        })
    }

    fn config(apps: &[(&str, &str)]) -> ResolvedConfig {
        let mut config = ResolvedConfig::default();
        for (group, name) in apps {
            let descriptor = app(group, name);
            config
                .apps
                .insert(descriptor.qualified_key.clone(), descriptor);
        }
        config
    }

    #[test]
    fn test_app_lookup_by_qualified_key() {
        let config = config(&[("group0", "app1"), ("group1", "app1")]);
        assert_eq!(config.app("Group1.App1").unwrap().group, "group1");
        assert!(config.app("group2.app1").is_none());
    }

    #[test]
    fn test_bare_app_lookup_prefers_default_group() {
        let config = config(&[
            ("a_group", "app1"),
            ("default_a", "app1"),
            ("default_b", "app1"),
            ("z", "app2"),
        ]);
        assert_eq!(config.app("app1").unwrap().group, "default_b");
        assert_eq!(config.app("app2").unwrap().group, "z");
        assert!(config.app("app3").is_none());
    }

    #[test]
    fn test_bare_app_lookup_falls_back_to_first_group() {
        let config = config(&[("group1", "app1"), ("group0", "app1")]);
        assert_eq!(config.app("app1").unwrap().group, "group0");
    }
}
