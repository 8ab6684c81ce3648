// snowai-core/src/domain/app.rs

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::connect::{ConnectDescriptor, DataConnectDescriptor, OAuthDescriptor};
use crate::domain::mlops::PipelineFlowDescriptor;

pub const DEFAULT_APP_DIR: &str = ".";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AppType {
    #[default]
    Streamlit,
    Notebook,
    Console,
    Base,
}

impl AppType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Streamlit => "streamlit",
            Self::Notebook => "notebook",
            Self::Console => "console",
            Self::Base => "base",
        }
    }
}

impl fmt::Display for AppType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AppType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "streamlit" | "streamlit_ml" => Ok(Self::Streamlit),
            "notebook" => Ok(Self::Notebook),
            "console" => Ok(Self::Console),
            "base" | "default" => Ok(Self::Base),
            _ => Err(format!("Unknown app type: {}", s)),
        }
    }
}

/// A fully resolved `[apps.<group>.<app>]` entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppDescriptor {
    pub qualified_key: String,
    pub group: String,
    pub app_short_name: String,
    #[serde(rename = "type")]
    pub app_type: AppType,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_env: Option<String>,
    pub app_path: String,
    pub script_home: String,
    pub root_path: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub group_attributes: BTreeMap<String, String>,
    pub connects: Vec<ConnectDescriptor>,
    pub ml_ops: Vec<Arc<PipelineFlowDescriptor>>,
}

impl AppDescriptor {
    /// `root_path/app_path`.
    pub fn app_dir(&self) -> PathBuf {
        PathBuf::from(&self.root_path).join(&self.app_path)
    }

    /// `root_path/app_path/script_home`.
    pub fn script_dir(&self) -> PathBuf {
        self.app_dir().join(&self.script_home)
    }

    /// First OAuth connect, in declaration order.
    pub fn default_oauth_connect(&self) -> Option<&Arc<OAuthDescriptor>> {
        self.connects.iter().find_map(|c| match c {
            ConnectDescriptor::OAuth(o) => Some(o),
            ConnectDescriptor::Data(_) => None,
        })
    }

    /// First Snowflake data connect, in declaration order.
    pub fn default_snowflake_connect(&self) -> Option<&Arc<DataConnectDescriptor>> {
        self.connects.iter().find_map(|c| match c {
            ConnectDescriptor::Data(d) if d.as_snowflake().is_some() => Some(d),
            _ => None,
        })
    }

    pub fn data_connects(&self) -> impl Iterator<Item = &Arc<DataConnectDescriptor>> {
        self.connects.iter().filter_map(|c| match c {
            ConnectDescriptor::Data(d) => Some(d),
            ConnectDescriptor::OAuth(_) => None,
        })
    }

    /// Every environment variable name any of the app's connects or flows needs,
    /// deduplicated, in first-seen order.
    pub fn required_env_vars(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let from_connects = self.connects.iter().flat_map(|c| c.required_env_vars());
        let from_flows = self.ml_ops.iter().flat_map(|flow| {
            let mut vars = flow.data_connect.required_env_vars();
            if let Some(registry) = &flow.model_registry {
                vars.extend(registry.data_connect.required_env_vars());
            }
            if let Some(store) = &flow.feature_store {
                vars.extend(store.data_connect.required_env_vars());
            }
            vars
        });

        for name in from_connects.chain(from_flows) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::connect::{DataConnectKind, FileConnect, SnowflakeAuth, SnowflakeConnect, StorageType};
    use std::str::FromStr;

    fn data(key: &str, kind: DataConnectKind) -> ConnectDescriptor {
        ConnectDescriptor::Data(Arc::new(DataConnectDescriptor {
            key: key.into(),
            name: None,
            kind,
        }))
    }

    fn app(connects: Vec<ConnectDescriptor>) -> AppDescriptor {
        AppDescriptor {
            qualified_key: "group0.app2".into(),
            group: "group0".into(),
            app_short_name: "group0_app2".into(),
            app_type: AppType::Notebook,
            name: "Notebook".into(),
            version: None,
            domain_env: None,
            app_path: "apps/app2".into(),
            script_home: "scripts".into(),
            root_path: "/srv".into(),
            group_attributes: BTreeMap::new(),
            connects,
            ml_ops: vec![],
        }
    }

    #[test]
    fn test_app_type_aliases() {
        assert_eq!(AppType::from_str("default").unwrap(), AppType::Base);
        assert_eq!(AppType::from_str("Streamlit_ML").unwrap(), AppType::Streamlit);
        assert!(AppType::from_str("desktop").is_err());
    }

    #[test]
    fn test_default_connect_lookups_skip_other_kinds() {
        let file = data(
            "local_csv",
            DataConnectKind::File(FileConnect {
                storage_type: StorageType::Local,
                format: "csv".into(),
                dir_path: "data".into(),
                file_name: "x.csv".into(),
            }),
        );
        let password = |key: &str| {
            data(
                key,
                DataConnectKind::Snowflake(SnowflakeConnect {
                    account: "a".into(),
                    user: Some("u".into()),
                    role: "r".into(),
                    warehouse: "w".into(),
                    database: "d".into(),
                    schema: "s".into(),
                    auth: SnowflakeAuth::Password {
                        password_env: "SNOWSQL_PWD".into(),
                    },
                }),
            )
        };

        let app = app(vec![file, password("first"), password("second")]);

        assert_eq!(app.default_snowflake_connect().unwrap().key, "first");
        assert!(app.default_oauth_connect().is_none());
        assert_eq!(app.data_connects().count(), 3);
        assert_eq!(app.required_env_vars(), vec!["SNOWSQL_PWD"]);
        assert_eq!(
            app.script_dir(),
            PathBuf::from("/srv").join("apps/app2").join("scripts")
        );
    }
}
