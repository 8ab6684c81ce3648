// snowai-core/src/domain/reference.rs
//
// Typed indirection for the dotted-path strings used across sections.
// A reference is parsed once at load time and never re-parsed at use sites.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::domain::error::DomainError;

pub const ROOT_APPS: &str = "apps";
pub const ROOT_APP_CONNECTS: &str = "app_connects";
pub const ROOT_ML_OPS: &str = "ml_ops";

const DEFAULT_MARKER: &str = "default";
const FIRST_INDEX_MARKER: &str = "_0";

// "<section>.<key>" or "<root>.<section>.<key>", after normalization.
#[allow(clippy::expect_used)]
static REFERENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9_-]+(\.[a-z0-9_-]+){1,2}$").expect("reference pattern is valid")
});

/// A section that can be the target of a dotted-path reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    OAuthConnects,
    DataConnects,
    PipelineFlows,
    ModelRegistries,
    FeatureStores,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::OAuthConnects,
        Section::DataConnects,
        Section::PipelineFlows,
        Section::ModelRegistries,
        Section::FeatureStores,
    ];

    /// Top-level table owning this section.
    pub fn root(self) -> &'static str {
        match self {
            Self::OAuthConnects | Self::DataConnects => ROOT_APP_CONNECTS,
            Self::PipelineFlows | Self::ModelRegistries | Self::FeatureStores => ROOT_ML_OPS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OAuthConnects => "oauth_connects",
            Self::DataConnects => "data_connects",
            Self::PipelineFlows => "pipeline_flows",
            Self::ModelRegistries => "model_registries",
            Self::FeatureStores => "feature_stores",
        }
    }

    /// Fully qualified location of an entry, e.g. `app_connects.oauth_connects.x`.
    pub fn location(self, key: &str) -> String {
        format!("{}.{}.{}", self.root(), self.as_str(), key)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("Unknown section: {}", s))
    }
}

/// A parsed, validated pointer to an entry of a [`Section`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryRef {
    section: Section,
    key: String,
}

impl EntryRef {
    pub fn new(section: Section, key: impl Into<String>) -> Self {
        Self {
            section,
            key: key.into(),
        }
    }

    /// Parses `raw` as a reference into one of the `allowed` sections.
    ///
    /// A malformed string, or one pointing into a section the field does not
    /// accept, is a schema error. A well-formed path naming a section that does
    /// not exist is a reference error.
    pub fn parse(
        raw: &str,
        allowed: &[Section],
        referenced_from: &str,
    ) -> Result<Self, DomainError> {
        let normalized = raw.trim().to_lowercase();
        if !REFERENCE_PATTERN.is_match(&normalized) {
            return Err(DomainError::schema(
                referenced_from,
                format!("malformed reference '{raw}', expected \"<section>.<key>\""),
            ));
        }

        let parts: Vec<&str> = normalized.split('.').collect();
        let (root, section_name, key) = match parts.as_slice() {
            [section, key] => (None, *section, *key),
            [root, section, key] => (Some(*root), *section, *key),
            _ => {
                return Err(DomainError::schema(
                    referenced_from,
                    format!("malformed reference '{raw}'"),
                ));
            }
        };

        let section: Section = section_name
            .parse()
            .map_err(|_| DomainError::reference(&normalized, referenced_from))?;

        if let Some(root) = root
            && root != section.root()
        {
            return Err(DomainError::reference(&normalized, referenced_from));
        }

        if !allowed.contains(&section) {
            let expected: Vec<&str> = allowed.iter().map(|s| s.as_str()).collect();
            return Err(DomainError::schema(
                referenced_from,
                format!(
                    "reference '{normalized}' must point into {}",
                    expected.join(" or ")
                ),
            ));
        }

        Ok(Self::new(section, key))
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Short form, as written in documents: `<section>.<key>`.
    pub fn path(&self) -> String {
        format!("{}.{}", self.section, self.key)
    }
}

impl fmt::Display for EntryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section, self.key)
    }
}

/// Splits `group.key` into `(group, key)`; a bare key yields an empty group.
pub fn split_group_key(key: &str) -> (String, String) {
    let normalized = key.trim().to_lowercase();
    match normalized.split_once('.') {
        Some((group, key)) => (group.to_string(), key.to_string()),
        None => (String::new(), normalized),
    }
}

/// Picks the conventional default among `keys`.
///
/// In sorted order, the first key containing `default` or `_0` wins;
/// otherwise the smallest key.
pub fn default_key<'a, I>(keys: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut sorted: Vec<&str> = keys.into_iter().collect();
    sorted.sort_unstable();

    sorted
        .iter()
        .find(|k| k.to_lowercase().contains(DEFAULT_MARKER) || k.contains(FIRST_INDEX_MARKER))
        .or_else(|| sorted.first())
        .copied()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const FROM: &str = "app_connects.data_connects.snflk";

    #[test]
    fn test_parse_short_and_qualified_forms() -> anyhow::Result<()> {
        let short = EntryRef::parse(
            "oauth_connects.client_creds_group0_app1",
            &[Section::OAuthConnects],
            FROM,
        )?;
        let qualified = EntryRef::parse(
            " App_Connects.OAuth_Connects.client_creds_group0_app1 ",
            &[Section::OAuthConnects],
            FROM,
        )?;

        assert_eq!(short, qualified);
        assert_eq!(short.section(), Section::OAuthConnects);
        assert_eq!(short.key(), "client_creds_group0_app1");
        assert_eq!(short.path(), "oauth_connects.client_creds_group0_app1");
        Ok(())
    }

    #[test]
    fn test_parse_unknown_section_is_reference_error() {
        let err = EntryRef::parse("vault_connects.x", &[Section::OAuthConnects], FROM).unwrap_err();
        assert_eq!(err, DomainError::reference("vault_connects.x", FROM));
    }

    #[test]
    fn test_parse_wrong_root_is_reference_error() {
        let err = EntryRef::parse(
            "ml_ops.oauth_connects.x",
            &[Section::OAuthConnects],
            FROM,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::ConfigReference { .. }));
    }

    #[test]
    fn test_parse_disallowed_section_is_schema_error() {
        let err = EntryRef::parse("oauth_connects.x", &[Section::DataConnects], FROM).unwrap_err();
        match err {
            DomainError::ConfigSchema { section, reason } => {
                assert_eq!(section, FROM);
                assert!(reason.contains("data_connects"));
            }
            other => panic!("Expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_malformed() {
        for raw in ["", "bare_key", "a.b.c.d", "oauth connects.x", "oauth_connects."] {
            let err = EntryRef::parse(raw, &Section::ALL, FROM).unwrap_err();
            assert!(
                matches!(err, DomainError::ConfigSchema { .. }),
                "'{raw}' should be malformed"
            );
        }
    }

    #[test]
    fn test_split_group_key() {
        assert_eq!(
            split_group_key(" Group0.App1 "),
            ("group0".to_string(), "app1".to_string())
        );
        assert_eq!(split_group_key("app1"), (String::new(), "app1".to_string()));
    }

    #[test]
    fn test_default_key_priority() {
        assert_eq!(default_key(["b", "my_default", "a_0"]), Some("a_0"));
        assert_eq!(default_key(["zeta", "default_conn"]), Some("default_conn"));
        assert_eq!(default_key(["snowflake_1", "snowflake_0"]), Some("snowflake_0"));
        assert_eq!(default_key(["zeta", "alpha"]), Some("alpha"));
        assert_eq!(default_key(Vec::<&str>::new()), None);
    }
}
