// snowai-core/src/domain/connect.rs
//
// Resolved connection descriptors: OAuth/SAML grant flows and data connects.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

// =============================================================================
//  1. OAUTH / SAML
// =============================================================================

pub const DEFAULT_CLIENT_SECRET_ENV: &str = "SNOWFLAKE_DEFAULT_APP_SECRET";
pub const DEFAULT_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const DEFAULT_CODE_CHALLENGE_METHOD: &str = "S256";
pub const DEFAULT_AUTH_RESPONSE_MODE: &str = "query";

pub fn default_auth_response_errors() -> Vec<String> {
    vec!["error".to_string(), "error_description".to_string()]
}

pub fn default_grant_token_response_fields() -> Vec<String> {
    vec!["access_token".to_string()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OAuthAuthType {
    #[serde(rename = "oauth")]
    OAuth,
    #[serde(rename = "externalbrowser")]
    ExternalBrowser,
}

impl OAuthAuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OAuth => "oauth",
            Self::ExternalBrowser => "externalbrowser",
        }
    }
}

impl fmt::Display for OAuthAuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OAuthAuthType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "oauth" => Ok(Self::OAuth),
            "externalbrowser" | "saml" => Ok(Self::ExternalBrowser),
            _ => Err(format!("Unknown OAuth auth_type: {}", s)),
        }
    }
}

/// OAuth token-acquisition method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantFlow {
    AuthCode,
    DeviceCode,
    ClientCredentials,
}

impl GrantFlow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthCode => "auth_code",
            Self::DeviceCode => "device_code",
            Self::ClientCredentials => "client_credentials",
        }
    }

    /// Flows that start with a request to `auth_request_url`.
    pub fn needs_authorization_request(&self) -> bool {
        matches!(self, Self::AuthCode | Self::DeviceCode)
    }
}

impl fmt::Display for GrantFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for GrantFlow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auth_code" | "authorization_code" => Ok(Self::AuthCode),
            "device_code" => Ok(Self::DeviceCode),
            "client_credentials" | "client_creds" => Ok(Self::ClientCredentials),
            _ => Err(format!("Unknown grant flow: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OAuthDescriptor {
    pub key: String,
    pub auth_type: OAuthAuthType,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub flow: Option<GrantFlow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grant_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    pub client_secret_env: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_request_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grant_token_request_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
    pub code_challenge_method: String,
    pub auth_response_mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_response_type: Option<String>,
    pub auth_response_fields: Vec<String>,
    pub auth_response_errors: Vec<String>,
    pub grant_token_response_fields: Vec<String>,
    pub verify_signature: bool,
}

impl OAuthDescriptor {
    /// Environment variable names the caller must resolve before a token request.
    pub fn required_env_vars(&self) -> Vec<&str> {
        match self.auth_type {
            OAuthAuthType::OAuth => vec![self.client_secret_env.as_str()],
            OAuthAuthType::ExternalBrowser => Vec::new(),
        }
    }
}

// =============================================================================
//  2. DATA CONNECTS
// =============================================================================

pub const DEFAULT_PASSWORD_ENV: &str = "SNOWSQL_PWD";
pub const DEFAULT_PRIVATE_KEY_PHRASE_ENV: &str = "SNOWFLAKE_USER_PRIVATE_KEY_PASSPHRASE";
pub const DEFAULT_PRIVATE_KEY_PATH_ENV: &str = "SNOWFLAKE_USER_PRIVATE_KEY_PATH";
pub const DEFAULT_FILE_FORMAT: &str = "csv";

/// How a Snowflake data connect authenticates, with the credentials each mode needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "auth_type")]
pub enum SnowflakeAuth {
    #[serde(rename = "snowflake")]
    Password { password_env: String },
    #[serde(rename = "keypair")]
    KeyPair {
        private_key_phrase_env: String,
        private_key_path_env: String,
    },
    #[serde(rename = "externalbrowser")]
    ExternalBrowser,
    #[serde(rename = "oauth")]
    OAuth { oauth_connect: Arc<OAuthDescriptor> },
}

impl SnowflakeAuth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Password { .. } => "snowflake",
            Self::KeyPair { .. } => "keypair",
            Self::ExternalBrowser => "externalbrowser",
            Self::OAuth { .. } => "oauth",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnowflakeConnect {
    pub account: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub role: String,
    pub warehouse: String,
    pub database: String,
    pub schema: String,
    pub auth: SnowflakeAuth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    #[default]
    Local,
    AzureAdls,
    AzureBlob,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::AzureAdls => "azure_adls",
            Self::AzureBlob => "azure_blob",
        }
    }
}

impl std::str::FromStr for StorageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "azure_adls" => Ok(Self::AzureAdls),
            "azure_blob" => Ok(Self::AzureBlob),
            _ => Err(format!("Unknown storage type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileConnect {
    pub storage_type: StorageType,
    pub format: String,
    pub dir_path: String,
    pub file_name: String,
}

impl FileConnect {
    pub fn path(&self) -> PathBuf {
        PathBuf::from(&self.dir_path).join(&self.file_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataConnectKind {
    Snowflake(SnowflakeConnect),
    File(FileConnect),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataConnectDescriptor {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub kind: DataConnectKind,
}

impl DataConnectDescriptor {
    pub fn type_str(&self) -> &'static str {
        match self.kind {
            DataConnectKind::Snowflake(_) => "snowflake",
            DataConnectKind::File(_) => "file",
        }
    }

    pub fn auth_type_str(&self) -> Option<&'static str> {
        match &self.kind {
            DataConnectKind::Snowflake(sf) => Some(sf.auth.as_str()),
            DataConnectKind::File(_) => None,
        }
    }

    pub fn as_snowflake(&self) -> Option<&SnowflakeConnect> {
        match &self.kind {
            DataConnectKind::Snowflake(sf) => Some(sf),
            DataConnectKind::File(_) => None,
        }
    }

    /// The embedded OAuth descriptor of an `auth_type = "oauth"` Snowflake connect.
    pub fn oauth_connect(&self) -> Option<&Arc<OAuthDescriptor>> {
        match &self.kind {
            DataConnectKind::Snowflake(SnowflakeConnect {
                auth: SnowflakeAuth::OAuth { oauth_connect },
                ..
            }) => Some(oauth_connect),
            _ => None,
        }
    }

    pub fn required_env_vars(&self) -> Vec<&str> {
        let DataConnectKind::Snowflake(sf) = &self.kind else {
            return Vec::new();
        };
        match &sf.auth {
            SnowflakeAuth::Password { password_env } => vec![password_env.as_str()],
            SnowflakeAuth::KeyPair {
                private_key_phrase_env,
                private_key_path_env,
            } => vec![
                private_key_phrase_env.as_str(),
                private_key_path_env.as_str(),
            ],
            SnowflakeAuth::ExternalBrowser => Vec::new(),
            SnowflakeAuth::OAuth { oauth_connect } => oauth_connect.required_env_vars(),
        }
    }
}

// =============================================================================
//  3. APP CONNECT (either kind)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "group", content = "connect", rename_all = "snake_case")]
pub enum ConnectDescriptor {
    #[serde(rename = "oauth_connects")]
    OAuth(Arc<OAuthDescriptor>),
    #[serde(rename = "data_connects")]
    Data(Arc<DataConnectDescriptor>),
}

impl ConnectDescriptor {
    pub fn key(&self) -> &str {
        match self {
            Self::OAuth(o) => &o.key,
            Self::Data(d) => &d.key,
        }
    }

    pub fn group(&self) -> &'static str {
        match self {
            Self::OAuth(_) => "oauth_connects",
            Self::Data(_) => "data_connects",
        }
    }

    pub fn auth_type_str(&self) -> Option<&'static str> {
        match self {
            Self::OAuth(o) => Some(o.auth_type.as_str()),
            Self::Data(d) => d.auth_type_str(),
        }
    }

    /// True for interactive identity-provider logins (`oauth` or `externalbrowser`).
    pub fn is_oauth_saml(&self) -> bool {
        matches!(self.auth_type_str(), Some("oauth") | Some("externalbrowser"))
    }

    pub fn required_env_vars(&self) -> Vec<&str> {
        match self {
            Self::OAuth(o) => o.required_env_vars(),
            Self::Data(d) => d.required_env_vars(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn oauth(auth_type: OAuthAuthType) -> OAuthDescriptor {
        OAuthDescriptor {
            key: "client_creds_group0_app1".into(),
            auth_type,
            flow: Some(GrantFlow::ClientCredentials),
            grant_type: Some("client_credentials".into()),
            client_id: Some("app".into()),
            client_secret_env: DEFAULT_CLIENT_SECRET_ENV.into(),
            tenant_id: None,
            scope: None,
            content_type: DEFAULT_CONTENT_TYPE.into(),
            auth_request_url: None,
            grant_token_request_url: Some("https://login.example.com/token".into()),
            redirect_uri: None,
            code_challenge_method: DEFAULT_CODE_CHALLENGE_METHOD.into(),
            auth_response_mode: DEFAULT_AUTH_RESPONSE_MODE.into(),
            auth_response_type: None,
            auth_response_fields: vec![],
            auth_response_errors: default_auth_response_errors(),
            grant_token_response_fields: default_grant_token_response_fields(),
            verify_signature: false,
        }
    }

    fn snowflake(auth: SnowflakeAuth) -> DataConnectDescriptor {
        DataConnectDescriptor {
            key: "snflk".into(),
            name: None,
            kind: DataConnectKind::Snowflake(SnowflakeConnect {
                account: "acct".into(),
                user: Some("user".into()),
                role: "r".into(),
                warehouse: "w".into(),
                database: "d".into(),
                schema: "s".into(),
                auth,
            }),
        }
    }

    #[test]
    fn test_grant_flow_aliases() {
        assert_eq!(GrantFlow::from_str("authorization_code").unwrap(), GrantFlow::AuthCode);
        assert_eq!(GrantFlow::from_str("CLIENT_CREDS").unwrap(), GrantFlow::ClientCredentials);
        assert!(GrantFlow::from_str("implicit").is_err());
        assert!(GrantFlow::DeviceCode.needs_authorization_request());
        assert!(!GrantFlow::ClientCredentials.needs_authorization_request());
    }

    #[test]
    fn test_required_env_vars_per_auth() {
        let password = snowflake(SnowflakeAuth::Password {
            password_env: DEFAULT_PASSWORD_ENV.into(),
        });
        assert_eq!(password.required_env_vars(), vec!["SNOWSQL_PWD"]);

        let keypair = snowflake(SnowflakeAuth::KeyPair {
            private_key_phrase_env: DEFAULT_PRIVATE_KEY_PHRASE_ENV.into(),
            private_key_path_env: DEFAULT_PRIVATE_KEY_PATH_ENV.into(),
        });
        assert_eq!(
            keypair.required_env_vars(),
            vec![
                "SNOWFLAKE_USER_PRIVATE_KEY_PASSPHRASE",
                "SNOWFLAKE_USER_PRIVATE_KEY_PATH"
            ]
        );

        let via_oauth = snowflake(SnowflakeAuth::OAuth {
            oauth_connect: Arc::new(oauth(OAuthAuthType::OAuth)),
        });
        assert_eq!(
            via_oauth.required_env_vars(),
            vec!["SNOWFLAKE_DEFAULT_APP_SECRET"]
        );
        assert!(via_oauth.oauth_connect().is_some());

        let browser = ConnectDescriptor::OAuth(Arc::new(oauth(OAuthAuthType::ExternalBrowser)));
        assert!(browser.required_env_vars().is_empty());
        assert!(browser.is_oauth_saml());
    }

    #[test]
    fn test_data_connect_serializes_with_tags() -> anyhow::Result<()> {
        let dc = snowflake(SnowflakeAuth::ExternalBrowser);
        let json = serde_json::to_value(&dc)?;
        assert_eq!(json["type"], "snowflake");
        assert_eq!(json["auth"]["auth_type"], "externalbrowser");
        assert_eq!(json["key"], "snflk");
        Ok(())
    }

    #[test]
    fn test_file_connect_path() {
        let fc = FileConnect {
            storage_type: StorageType::Local,
            format: DEFAULT_FILE_FORMAT.into(),
            dir_path: "data".into(),
            file_name: "customers.csv".into(),
        };
        assert_eq!(fc.path(), PathBuf::from("data").join("customers.csv"));
        assert_eq!(StorageType::from_str("Azure_Blob").unwrap(), StorageType::AzureBlob);
    }
}
