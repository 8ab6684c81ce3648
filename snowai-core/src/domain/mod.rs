// snowai-core/src/domain/mod.rs

pub mod app;
pub mod connect;
pub mod error;
pub mod mlops;
pub mod reference;
pub mod resolved;

pub use app::{AppDescriptor, AppType};
pub use connect::{
    ConnectDescriptor, DataConnectDescriptor, DataConnectKind, FileConnect, GrantFlow,
    OAuthAuthType, OAuthDescriptor, SnowflakeAuth, SnowflakeConnect, StorageType,
};
pub use error::DomainError;
pub use mlops::{
    ExecutionMode, FeatureStoreDescriptor, ModelRegistryDescriptor, PipelineFlowDescriptor,
    StepTask,
};
pub use reference::{EntryRef, Section, default_key, split_group_key};
pub use resolved::ResolvedConfig;
