// snowai-core/src/application/resolver.rs
//
// Single pass over a ConfigDocument. Sections are built in dependency order
// (oauth -> data -> registries/stores -> flows -> apps) so every reference
// target already exists when it is looked up. Targets are shared via Arc.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::domain::app::{AppDescriptor, AppType, DEFAULT_APP_DIR};
use crate::domain::connect::{
    self, ConnectDescriptor, DataConnectDescriptor, DataConnectKind, FileConnect, GrantFlow,
    OAuthAuthType, OAuthDescriptor, SnowflakeAuth, SnowflakeConnect, StorageType,
};
use crate::domain::error::DomainError;
use crate::domain::mlops::{
    DEFAULT_ML_BACKEND, ExecutionMode, FeatureStoreDescriptor, ModelRegistryDescriptor,
    PipelineFlowDescriptor, StepTask,
};
use crate::domain::reference::{EntryRef, ROOT_APPS, Section};
use crate::domain::resolved::ResolvedConfig;
use crate::infrastructure::config::document::{
    AppsDefaults, ConfigDocument, EntryGroup, K_INIT_LIST, RawApp, RawDataConnect,
    RawFeatureStore, RawModelRegistry, RawOAuthConnect, RawPipelineFlow,
};

const CONNECT_TYPE_SNOWFLAKE: &str = "snowflake";
const CONNECT_TYPE_FILE: &str = "file";

type Registry<T> = BTreeMap<String, Arc<T>>;

/// Resolves every entry of every section of `doc`.
///
/// Fails on the first dangling reference or schema violation; no partial
/// configuration is returned.
#[instrument(skip(doc))]
pub fn resolve(doc: &ConfigDocument) -> Result<ResolvedConfig, DomainError> {
    let mut config = ResolvedConfig::default();

    for (key, raw) in &doc.oauth_connects.entries {
        let descriptor = build_oauth(key, raw)?;
        debug!(key = %key, flow = ?descriptor.flow, "Resolved OAuth connect");
        config.oauth_connects.insert(key.clone(), Arc::new(descriptor));
    }
    config.oauth_init_list = resolve_init_list(&doc.oauth_connects, &config.oauth_connects)?;

    for (key, raw) in &doc.data_connects.entries {
        let descriptor = build_data_connect(key, raw, &config.oauth_connects)?;
        debug!(key = %key, kind = descriptor.type_str(), "Resolved data connect");
        config.data_connects.insert(key.clone(), Arc::new(descriptor));
    }

    for (key, raw) in &doc.model_registries.entries {
        let descriptor = build_model_registry(key, raw, &config.data_connects)?;
        config.model_registries.insert(key.clone(), Arc::new(descriptor));
    }

    for (key, raw) in &doc.feature_stores.entries {
        let descriptor = build_feature_store(key, raw, &config.data_connects)?;
        config.feature_stores.insert(key.clone(), Arc::new(descriptor));
    }

    for (key, raw) in &doc.pipeline_flows.entries {
        let descriptor = build_pipeline_flow(key, raw, &config)?;
        debug!(key = %key, steps = descriptor.step_tasks.len(), "Resolved pipeline flow");
        config.pipeline_flows.insert(key.clone(), Arc::new(descriptor));
    }

    for (group_key, group) in &doc.app_groups {
        let attributes = group.string_attributes();
        for (app_key, raw) in &group.entries {
            let descriptor =
                build_app(group_key, app_key, raw, &doc.apps_defaults, &attributes, &config)?;
            debug!(app = %descriptor.qualified_key, connects = descriptor.connects.len(), "Resolved app");
            config
                .apps
                .insert(descriptor.qualified_key.clone(), Arc::new(descriptor));
        }
        config.app_groups.insert(group_key.clone(), attributes);
    }

    info!(
        apps = config.apps.len(),
        oauth_connects = config.oauth_connects.len(),
        data_connects = config.data_connects.len(),
        pipeline_flows = config.pipeline_flows.len(),
        "Configuration resolved"
    );
    Ok(config)
}

// --- APP CONNECTS ---

fn build_oauth(key: &str, raw: &RawOAuthConnect) -> Result<OAuthDescriptor, DomainError> {
    let location = Section::OAuthConnects.location(key);

    let auth_type_raw = required(&raw.auth_type, &location, "auth_type", "an OAuth connect")?;
    let auth_type: OAuthAuthType = auth_type_raw
        .parse()
        .map_err(|_| unsupported(&location, "auth_type", &auth_type_raw))?;

    let flow = raw
        .flow
        .as_deref()
        .map(|f| f.parse::<GrantFlow>().map_err(|_| unsupported(&location, "type", f)))
        .transpose()?;

    let mut descriptor = OAuthDescriptor {
        key: key.to_string(),
        auth_type,
        flow,
        grant_type: optional(&raw.grant_type),
        client_id: optional(&raw.client_id),
        client_secret_env: raw
            .client_secret_env
            .clone()
            .unwrap_or_else(|| connect::DEFAULT_CLIENT_SECRET_ENV.to_string()),
        tenant_id: optional(&raw.tenant_id),
        scope: optional(&raw.scope),
        content_type: raw
            .content_type
            .clone()
            .unwrap_or_else(|| connect::DEFAULT_CONTENT_TYPE.to_string()),
        auth_request_url: optional(&raw.auth_request_url),
        grant_token_request_url: optional(&raw.grant_token_request_url),
        redirect_uri: optional(&raw.redirect_uri),
        code_challenge_method: raw
            .code_challenge_method
            .clone()
            .unwrap_or_else(|| connect::DEFAULT_CODE_CHALLENGE_METHOD.to_string()),
        auth_response_mode: raw
            .auth_response_mode
            .clone()
            .unwrap_or_else(|| connect::DEFAULT_AUTH_RESPONSE_MODE.to_string()),
        auth_response_type: optional(&raw.auth_response_type),
        auth_response_fields: raw.auth_response_fields.clone().unwrap_or_default(),
        auth_response_errors: raw
            .auth_response_errors
            .clone()
            .unwrap_or_else(connect::default_auth_response_errors),
        grant_token_response_fields: raw
            .grant_token_response_fields
            .clone()
            .unwrap_or_else(connect::default_grant_token_response_fields),
        verify_signature: raw.verify_signature.unwrap_or(false),
    };

    if auth_type == OAuthAuthType::OAuth {
        let context = "auth_type = \"oauth\"";
        let flow = descriptor
            .flow
            .ok_or_else(|| DomainError::missing_field(&location, "type", context))?;
        descriptor.grant_type = Some(required(&raw.grant_type, &location, "grant_type", context)?);
        descriptor.client_id = Some(required(&raw.client_id, &location, "client_id", context)?);
        descriptor.grant_token_request_url = Some(required(
            &raw.grant_token_request_url,
            &location,
            "grant_token_request_url",
            context,
        )?);

        let flow_context = format!("type = \"{flow}\"");
        if flow.needs_authorization_request() {
            required(&raw.auth_request_url, &location, "auth_request_url", &flow_context)?;
        }
        if flow == GrantFlow::AuthCode {
            required(&raw.redirect_uri, &location, "redirect_uri", &flow_context)?;
        }
    }

    Ok(descriptor)
}

fn resolve_init_list(
    group: &EntryGroup<RawOAuthConnect>,
    oauth_connects: &Registry<OAuthDescriptor>,
) -> Result<Vec<String>, DomainError> {
    let location = Section::OAuthConnects.location(K_INIT_LIST);
    let Some(value) = group.attributes.get(K_INIT_LIST) else {
        return Ok(Vec::new());
    };

    let items = value
        .as_array()
        .ok_or_else(|| DomainError::schema(&location, "init_list must be an array of keys"))?;

    items
        .iter()
        .map(|item| {
            let key = item
                .as_str()
                .ok_or_else(|| DomainError::schema(&location, "init_list entries must be strings"))?
                .trim()
                .to_lowercase();
            if oauth_connects.contains_key(&key) {
                Ok(key)
            } else {
                Err(DomainError::reference(
                    EntryRef::new(Section::OAuthConnects, key).path(),
                    &location,
                ))
            }
        })
        .collect()
}

fn build_data_connect(
    key: &str,
    raw: &RawDataConnect,
    oauth_connects: &Registry<OAuthDescriptor>,
) -> Result<DataConnectDescriptor, DomainError> {
    let location = Section::DataConnects.location(key);
    let connect_type = raw
        .connect_type
        .as_deref()
        .unwrap_or(CONNECT_TYPE_SNOWFLAKE)
        .trim()
        .to_lowercase();

    let kind = match connect_type.as_str() {
        CONNECT_TYPE_SNOWFLAKE => {
            DataConnectKind::Snowflake(build_snowflake(&location, raw, oauth_connects)?)
        }
        CONNECT_TYPE_FILE => DataConnectKind::File(build_file(&location, raw)?),
        other => return Err(unsupported(&location, "type", other)),
    };

    Ok(DataConnectDescriptor {
        key: key.to_string(),
        name: optional(&raw.name),
        kind,
    })
}

fn build_snowflake(
    location: &str,
    raw: &RawDataConnect,
    oauth_connects: &Registry<OAuthDescriptor>,
) -> Result<SnowflakeConnect, DomainError> {
    let context = "type = \"snowflake\"";
    let auth_type = required(&raw.auth_type, location, "auth_type", context)?.to_lowercase();

    let auth = match auth_type.as_str() {
        "snowflake" => SnowflakeAuth::Password {
            password_env: raw
                .password_env
                .clone()
                .unwrap_or_else(|| connect::DEFAULT_PASSWORD_ENV.to_string()),
        },
        "keypair" => SnowflakeAuth::KeyPair {
            private_key_phrase_env: raw
                .private_key_phrase_env
                .clone()
                .unwrap_or_else(|| connect::DEFAULT_PRIVATE_KEY_PHRASE_ENV.to_string()),
            private_key_path_env: raw
                .private_key_path_env
                .clone()
                .unwrap_or_else(|| connect::DEFAULT_PRIVATE_KEY_PATH_ENV.to_string()),
        },
        "externalbrowser" => SnowflakeAuth::ExternalBrowser,
        "oauth" => {
            let raw_ref = required(
                &raw.oauth_connect,
                location,
                "oauth_connect",
                "auth_type = \"oauth\"",
            )?;
            let reference = EntryRef::parse(&raw_ref, &[Section::OAuthConnects], location)?;
            SnowflakeAuth::OAuth {
                oauth_connect: lookup(oauth_connects, &reference, location)?,
            }
        }
        other => return Err(unsupported(location, "auth_type", other)),
    };

    let user = match auth {
        SnowflakeAuth::OAuth { .. } => optional(&raw.user),
        _ => Some(required(
            &raw.user,
            location,
            "user",
            &format!("auth_type = \"{auth_type}\""),
        )?),
    };

    Ok(SnowflakeConnect {
        account: required(&raw.account, location, "account", context)?,
        user,
        role: required(&raw.role, location, "role", context)?,
        warehouse: required(&raw.warehouse, location, "warehouse", context)?,
        database: required(&raw.database, location, "database", context)?,
        schema: required(&raw.schema, location, "schema", context)?,
        auth,
    })
}

fn build_file(location: &str, raw: &RawDataConnect) -> Result<FileConnect, DomainError> {
    let context = "type = \"file\"";
    let storage_type = match raw.storage_type.as_deref() {
        Some(s) => s
            .parse::<StorageType>()
            .map_err(|_| unsupported(location, "storage_type", s))?,
        None => StorageType::default(),
    };

    Ok(FileConnect {
        storage_type,
        format: raw
            .format
            .as_deref()
            .map(|f| f.trim().to_lowercase())
            .unwrap_or_else(|| connect::DEFAULT_FILE_FORMAT.to_string()),
        dir_path: required(&raw.dir_path, location, "dir_path", context)?,
        file_name: required(&raw.file_name, location, "file_name", context)?,
    })
}

// --- ML OPS ---

fn build_model_registry(
    key: &str,
    raw: &RawModelRegistry,
    data_connects: &Registry<DataConnectDescriptor>,
) -> Result<ModelRegistryDescriptor, DomainError> {
    let location = Section::ModelRegistries.location(key);
    let context = "a model registry";

    Ok(ModelRegistryDescriptor {
        key: key.to_string(),
        registry_type: backend(&raw.registry_type),
        data_connect: required_data_connect(&raw.data_connect, &location, context, data_connects)?,
        registry_table: required(&raw.registry_table, &location, "registry_table", context)?,
    })
}

fn build_feature_store(
    key: &str,
    raw: &RawFeatureStore,
    data_connects: &Registry<DataConnectDescriptor>,
) -> Result<FeatureStoreDescriptor, DomainError> {
    let location = Section::FeatureStores.location(key);

    Ok(FeatureStoreDescriptor {
        key: key.to_string(),
        store_type: backend(&raw.store_type),
        data_connect: required_data_connect(
            &raw.data_connect,
            &location,
            "a feature store",
            data_connects,
        )?,
        database: optional(&raw.database),
        schema: optional(&raw.schema),
    })
}

fn build_pipeline_flow(
    key: &str,
    raw: &RawPipelineFlow,
    resolved: &ResolvedConfig,
) -> Result<PipelineFlowDescriptor, DomainError> {
    let location = Section::PipelineFlows.location(key);

    let data_connect = required_data_connect(
        &raw.data_connect,
        &location,
        "a pipeline flow",
        &resolved.data_connects,
    )?;

    let model_registry = raw
        .model_registry
        .as_deref()
        .map(|r| {
            let reference = EntryRef::parse(r, &[Section::ModelRegistries], &location)?;
            lookup(&resolved.model_registries, &reference, &location)
        })
        .transpose()?;

    let feature_store = raw
        .feature_store
        .as_deref()
        .map(|r| {
            let reference = EntryRef::parse(r, &[Section::FeatureStores], &location)?;
            lookup(&resolved.feature_stores, &reference, &location)
        })
        .transpose()?;

    let execution_mode = match raw.execution_mode.as_deref() {
        Some(mode) => mode
            .parse::<ExecutionMode>()
            .map_err(|_| unsupported(&location, "execution_mode", mode))?,
        None => ExecutionMode::default(),
    };

    Ok(PipelineFlowDescriptor {
        key: key.to_string(),
        name: optional(&raw.name),
        data_connect,
        model_registry,
        feature_store,
        execution_mode,
        step_tasks: parse_step_tasks(&location, &raw.step_tasks)?,
    })
}

fn parse_step_tasks(location: &str, raw: &[String]) -> Result<Vec<StepTask>, DomainError> {
    if raw.is_empty() {
        return Err(DomainError::schema(location, "step_tasks must not be empty"));
    }

    let mut seen = BTreeSet::new();
    let mut tasks = Vec::with_capacity(raw.len());
    for item in raw {
        let task: StepTask = item
            .parse()
            .map_err(|_| unsupported(location, "step_tasks", item))?;
        if !seen.insert(task) {
            return Err(DomainError::schema(
                location,
                format!("duplicate step task '{task}'"),
            ));
        }
        tasks.push(task);
    }
    Ok(tasks)
}

// --- APPS ---

fn build_app(
    group: &str,
    app: &str,
    raw: &RawApp,
    defaults: &AppsDefaults,
    group_attributes: &BTreeMap<String, String>,
    resolved: &ResolvedConfig,
) -> Result<AppDescriptor, DomainError> {
    let qualified_key = format!("{group}.{app}");
    let location = format!("{ROOT_APPS}.{qualified_key}");

    let type_raw = raw
        .app_type
        .as_deref()
        .or(defaults.app_type.as_deref());
    let app_type = match type_raw {
        Some(t) => t
            .parse::<AppType>()
            .map_err(|_| unsupported(&location, "type", t))?,
        None => AppType::default(),
    };

    let connects = raw
        .app_connects
        .iter()
        .map(|r| {
            let reference = EntryRef::parse(
                r,
                &[Section::OAuthConnects, Section::DataConnects],
                &location,
            )?;
            match reference.section() {
                Section::OAuthConnects => Ok(ConnectDescriptor::OAuth(lookup(
                    &resolved.oauth_connects,
                    &reference,
                    &location,
                )?)),
                _ => Ok(ConnectDescriptor::Data(lookup(
                    &resolved.data_connects,
                    &reference,
                    &location,
                )?)),
            }
        })
        .collect::<Result<Vec<_>, DomainError>>()?;

    let ml_ops = raw
        .ml_ops
        .iter()
        .map(|r| {
            let reference = EntryRef::parse(r, &[Section::PipelineFlows], &location)?;
            lookup(&resolved.pipeline_flows, &reference, &location)
        })
        .collect::<Result<Vec<_>, DomainError>>()?;

    Ok(AppDescriptor {
        app_short_name: optional(&raw.app_short_name)
            .unwrap_or_else(|| format!("{group}_{app}")),
        group: group.to_string(),
        app_type,
        name: required(&raw.name, &location, "name", "an app entry")?,
        version: optional(&raw.version),
        domain_env: optional(&raw.domain_env),
        app_path: optional(&raw.app_path).unwrap_or_else(|| DEFAULT_APP_DIR.to_string()),
        script_home: optional(&raw.script_home).unwrap_or_else(|| DEFAULT_APP_DIR.to_string()),
        root_path: optional(&raw.root_path)
            .or_else(|| optional(&defaults.root_path))
            .unwrap_or_else(|| DEFAULT_APP_DIR.to_string()),
        group_attributes: group_attributes.clone(),
        connects,
        ml_ops,
        qualified_key,
    })
}

// --- HELPERS ---

fn lookup<T>(
    registry: &Registry<T>,
    reference: &EntryRef,
    referenced_from: &str,
) -> Result<Arc<T>, DomainError> {
    registry
        .get(reference.key())
        .cloned()
        .ok_or_else(|| DomainError::reference(reference.path(), referenced_from))
}

fn required_data_connect(
    raw: &Option<String>,
    location: &str,
    context: &str,
    data_connects: &Registry<DataConnectDescriptor>,
) -> Result<Arc<DataConnectDescriptor>, DomainError> {
    let raw_ref = required(raw, location, "data_connect", context)?;
    let reference = EntryRef::parse(&raw_ref, &[Section::DataConnects], location)?;
    lookup(data_connects, &reference, location)
}

fn required(
    value: &Option<String>,
    location: &str,
    field: &str,
    context: &str,
) -> Result<String, DomainError> {
    optional(value).ok_or_else(|| DomainError::missing_field(location, field, context))
}

/// Trimmed value, with blank strings treated as absent.
fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn backend(value: &Option<String>) -> String {
    optional(value)
        .map(|v| v.to_lowercase())
        .unwrap_or_else(|| DEFAULT_ML_BACKEND.to_string())
}

fn unsupported(location: &str, field: &str, value: &str) -> DomainError {
    DomainError::schema(location, format!("unsupported {field} '{value}'"))
}
