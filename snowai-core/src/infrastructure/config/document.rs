// snowai-core/src/infrastructure/config/document.rs
//
// Typed view over the raw TOML tree. Nothing here follows references:
// every field is still the string the user wrote. Shape errors (wrong value
// types, bad URLs, empty names) surface here as schema errors.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};
use validator::Validate;

use crate::domain::error::DomainError;
use crate::domain::reference::{ROOT_APP_CONNECTS, ROOT_APPS, ROOT_ML_OPS, Section};

pub const K_TYPE: &str = "type";
pub const K_ROOT_PATH: &str = "root_path";
pub const K_INIT_LIST: &str = "init_list";

// --- RAW ENTRIES ---

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RawApp {
    pub app_short_name: Option<String>,
    #[serde(rename = "type")]
    pub app_type: Option<String>,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub version: Option<String>,
    #[serde(alias = "environment")]
    pub domain_env: Option<String>,
    #[serde(alias = "app_dir")]
    pub app_path: Option<String>,
    #[serde(alias = "script_home_dir")]
    pub script_home: Option<String>,
    pub root_path: Option<String>,
    #[serde(default)]
    pub app_connects: Vec<String>,
    #[serde(default)]
    pub ml_ops: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RawOAuthConnect {
    pub auth_type: Option<String>,
    #[serde(rename = "type")]
    pub flow: Option<String>,
    pub grant_type: Option<String>,
    #[validate(length(min = 1, message = "client_id must not be empty"))]
    pub client_id: Option<String>,
    pub client_secret_env: Option<String>,
    pub tenant_id: Option<String>,
    pub scope: Option<String>,
    pub content_type: Option<String>,
    #[validate(url(message = "auth_request_url must be a valid URL"))]
    pub auth_request_url: Option<String>,
    #[validate(url(message = "grant_token_request_url must be a valid URL"))]
    pub grant_token_request_url: Option<String>,
    #[validate(url(message = "redirect_uri must be a valid URL"))]
    pub redirect_uri: Option<String>,
    pub code_challenge_method: Option<String>,
    pub auth_response_mode: Option<String>,
    pub auth_response_type: Option<String>,
    pub auth_response_fields: Option<Vec<String>>,
    pub auth_response_errors: Option<Vec<String>>,
    pub grant_token_response_fields: Option<Vec<String>>,
    pub verify_signature: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RawDataConnect {
    #[serde(rename = "type")]
    pub connect_type: Option<String>,
    pub name: Option<String>,
    pub auth_type: Option<String>,

    // snowflake
    #[validate(length(min = 1, message = "account must not be empty"))]
    pub account: Option<String>,
    pub user: Option<String>,
    pub role: Option<String>,
    pub warehouse: Option<String>,
    pub database: Option<String>,
    pub schema: Option<String>,
    pub password_env: Option<String>,
    pub private_key_phrase_env: Option<String>,
    pub private_key_path_env: Option<String>,
    pub oauth_connect: Option<String>,

    // file
    pub storage_type: Option<String>,
    pub format: Option<String>,
    pub dir_path: Option<String>,
    #[validate(length(min = 1, message = "file_name must not be empty"))]
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RawPipelineFlow {
    pub name: Option<String>,
    pub data_connect: Option<String>,
    pub model_registry: Option<String>,
    pub feature_store: Option<String>,
    pub execution_mode: Option<String>,
    #[serde(default)]
    pub step_tasks: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RawModelRegistry {
    #[serde(rename = "type")]
    pub registry_type: Option<String>,
    pub data_connect: Option<String>,
    #[validate(length(min = 1, message = "registry_table must not be empty"))]
    pub registry_table: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RawFeatureStore {
    #[serde(rename = "type")]
    pub store_type: Option<String>,
    pub data_connect: Option<String>,
    pub database: Option<String>,
    pub schema: Option<String>,
}

// --- GROUPS ---

/// A group table: nested tables are entries, everything else is an attribute.
#[derive(Debug, Clone)]
pub struct EntryGroup<T> {
    pub attributes: BTreeMap<String, toml::Value>,
    pub entries: BTreeMap<String, T>,
}

impl<T> Default for EntryGroup<T> {
    fn default() -> Self {
        Self {
            attributes: BTreeMap::new(),
            entries: BTreeMap::new(),
        }
    }
}

impl<T> EntryGroup<T> {
    /// Scalar attributes rendered as strings (TOML strings unquoted).
    pub fn string_attributes(&self) -> BTreeMap<String, String> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.clone(), attribute_string(v)))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppsDefaults {
    pub app_type: Option<String>,
    pub root_path: Option<String>,
}

/// The whole document, keys normalized, entries typed but unresolved.
#[derive(Debug, Clone, Default)]
pub struct ConfigDocument {
    pub apps_defaults: AppsDefaults,
    pub app_groups: BTreeMap<String, EntryGroup<RawApp>>,
    pub oauth_connects: EntryGroup<RawOAuthConnect>,
    pub data_connects: EntryGroup<RawDataConnect>,
    pub pipeline_flows: EntryGroup<RawPipelineFlow>,
    pub model_registries: EntryGroup<RawModelRegistry>,
    pub feature_stores: EntryGroup<RawFeatureStore>,
}

impl ConfigDocument {
    #[instrument(skip(table), fields(top_level_keys = table.len()))]
    pub fn from_table(table: toml::Table) -> Result<Self, DomainError> {
        let mut doc = ConfigDocument::default();

        for (key, value) in normalize_table("", table)? {
            match key.as_str() {
                ROOT_APPS => doc.read_apps(value)?,
                ROOT_APP_CONNECTS => doc.read_app_connects(value)?,
                ROOT_ML_OPS => doc.read_ml_ops(value)?,
                other => debug!(key = other, "Ignoring unrelated top-level table"),
            }
        }

        Ok(doc)
    }

    fn read_apps(&mut self, value: toml::Value) -> Result<(), DomainError> {
        for (key, value) in expect_table(ROOT_APPS, value)? {
            match value {
                toml::Value::Table(group) => {
                    let location = format!("{ROOT_APPS}.{key}");
                    let group = read_group::<RawApp>(&location, group)?;
                    self.app_groups.insert(key, group);
                }
                scalar => match key.as_str() {
                    K_TYPE => self.apps_defaults.app_type = Some(attribute_string(&scalar)),
                    K_ROOT_PATH => self.apps_defaults.root_path = Some(attribute_string(&scalar)),
                    other => debug!(key = other, "Ignoring [apps] attribute"),
                },
            }
        }
        Ok(())
    }

    fn read_app_connects(&mut self, value: toml::Value) -> Result<(), DomainError> {
        for (key, value) in expect_table(ROOT_APP_CONNECTS, value)? {
            let location = format!("{ROOT_APP_CONNECTS}.{key}");
            match key.parse::<Section>() {
                Ok(Section::OAuthConnects) => {
                    self.oauth_connects = read_group(&location, expect_table(&location, value)?)?;
                }
                Ok(Section::DataConnects) => {
                    self.data_connects = read_group(&location, expect_table(&location, value)?)?;
                }
                _ => warn!(section = %location, "Unknown app_connects section ignored"),
            }
        }
        Ok(())
    }

    fn read_ml_ops(&mut self, value: toml::Value) -> Result<(), DomainError> {
        for (key, value) in expect_table(ROOT_ML_OPS, value)? {
            let location = format!("{ROOT_ML_OPS}.{key}");
            match key.parse::<Section>() {
                Ok(Section::PipelineFlows) => {
                    self.pipeline_flows = read_group(&location, expect_table(&location, value)?)?;
                }
                Ok(Section::ModelRegistries) => {
                    self.model_registries = read_group(&location, expect_table(&location, value)?)?;
                }
                Ok(Section::FeatureStores) => {
                    self.feature_stores = read_group(&location, expect_table(&location, value)?)?;
                }
                _ => warn!(section = %location, "Unknown ml_ops section ignored"),
            }
        }
        Ok(())
    }
}

// --- HELPERS ---

fn read_group<T>(location: &str, table: toml::Table) -> Result<EntryGroup<T>, DomainError>
where
    T: DeserializeOwned + Validate,
{
    let mut group = EntryGroup::default();
    for (key, value) in table {
        if value.is_table() {
            let entry_location = format!("{location}.{key}");
            let entry = parse_entry::<T>(&entry_location, value)?;
            group.entries.insert(key, entry);
        } else {
            group.attributes.insert(key, value);
        }
    }
    Ok(group)
}

fn parse_entry<T>(location: &str, value: toml::Value) -> Result<T, DomainError>
where
    T: DeserializeOwned + Validate,
{
    let value = match value {
        toml::Value::Table(mut table) => {
            // Blank strings count as absent.
            table.retain(|_, v| !v.as_str().is_some_and(|s| s.trim().is_empty()));
            toml::Value::Table(table)
        }
        other => other,
    };
    let entry: T = value
        .try_into()
        .map_err(|e: toml::de::Error| DomainError::schema(location, e.to_string().trim()))?;
    entry
        .validate()
        .map_err(|e| DomainError::schema(location, format!("invalid field value: {e}")))?;
    Ok(entry)
}

fn expect_table(location: &str, value: toml::Value) -> Result<toml::Table, DomainError> {
    match value {
        toml::Value::Table(table) => Ok(table),
        other => Err(DomainError::schema(
            location,
            format!("expected a table, found {}", other.type_str()),
        )),
    }
}

/// Trims and lowercases every key; two keys that collapse to the same form are
/// a schema error at their parent table.
fn normalize_table(location: &str, table: toml::Table) -> Result<toml::Table, DomainError> {
    let mut normalized = toml::Table::new();
    for (key, value) in table {
        let key = key.trim().to_lowercase();
        let child = if location.is_empty() {
            key.clone()
        } else {
            format!("{location}.{key}")
        };
        let value = normalize_value(&child, value)?;
        if normalized.insert(key.clone(), value).is_some() {
            let parent = if location.is_empty() { "<root>" } else { location };
            return Err(DomainError::schema(
                parent,
                format!("duplicate key '{key}' after normalization"),
            ));
        }
    }
    Ok(normalized)
}

fn normalize_value(location: &str, value: toml::Value) -> Result<toml::Value, DomainError> {
    Ok(match value {
        toml::Value::Table(table) => toml::Value::Table(normalize_table(location, table)?),
        toml::Value::Array(items) => toml::Value::Array(
            items
                .into_iter()
                .map(|item| normalize_value(location, item))
                .collect::<Result<_, _>>()?,
        ),
        other => other,
    })
}

fn attribute_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
