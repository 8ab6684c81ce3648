// snowai-core/src/domain/mlops.rs

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::domain::connect::DataConnectDescriptor;

pub const DEFAULT_ML_BACKEND: &str = "snowflake";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    #[default]
    Sequential,
    Parallelable,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Parallelable => "parallelable",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "parallelable" | "parallel" => Ok(Self::Parallelable),
            _ => Err(format!("Unknown execution mode: {}", s)),
        }
    }
}

/// One stage of an ML pipeline flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepTask {
    Setup,
    Ingest,
    Preprocess,
    FeatureEngineering,
    Train,
    Tune,
    Evaluate,
    Register,
    Deploy,
    Monitor,
}

impl StepTask {
    pub const ALL: [StepTask; 10] = [
        StepTask::Setup,
        StepTask::Ingest,
        StepTask::Preprocess,
        StepTask::FeatureEngineering,
        StepTask::Train,
        StepTask::Tune,
        StepTask::Evaluate,
        StepTask::Register,
        StepTask::Deploy,
        StepTask::Monitor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Ingest => "ingest",
            Self::Preprocess => "preprocess",
            Self::FeatureEngineering => "feature_engineering",
            Self::Train => "train",
            Self::Tune => "tune",
            Self::Evaluate => "evaluate",
            Self::Register => "register",
            Self::Deploy => "deploy",
            Self::Monitor => "monitor",
        }
    }
}

impl fmt::Display for StepTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StepTask {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        StepTask::ALL
            .into_iter()
            .find(|task| task.as_str() == normalized)
            .ok_or_else(|| format!("Unknown step task: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelRegistryDescriptor {
    pub key: String,
    #[serde(rename = "type")]
    pub registry_type: String,
    pub data_connect: Arc<DataConnectDescriptor>,
    pub registry_table: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureStoreDescriptor {
    pub key: String,
    #[serde(rename = "type")]
    pub store_type: String,
    pub data_connect: Arc<DataConnectDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

/// A resolved `[ml_ops.pipeline_flows.<key>]` entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineFlowDescriptor {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub data_connect: Arc<DataConnectDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_registry: Option<Arc<ModelRegistryDescriptor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_store: Option<Arc<FeatureStoreDescriptor>>,
    pub execution_mode: ExecutionMode,
    pub step_tasks: Vec<StepTask>,
}
