// snowai-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum DomainError {
    #[error("ConfigReferenceError: '{path}' referenced from [{referenced_from}] does not resolve")]
    #[diagnostic(
        code(snowai::domain::reference),
        help("Point the reference at an existing section, e.g. \"oauth_connects.<key>\".")
    )]
    ConfigReference {
        path: String,
        referenced_from: String,
    },

    #[error("ConfigSchemaError: [{section}] {reason}")]
    #[diagnostic(
        code(snowai::domain::schema),
        help("Check the fields required by the declared `type` / `auth_type`.")
    )]
    ConfigSchema { section: String, reason: String },
}

impl DomainError {
    pub fn reference(path: impl Into<String>, referenced_from: impl Into<String>) -> Self {
        Self::ConfigReference {
            path: path.into(),
            referenced_from: referenced_from.into(),
        }
    }

    pub fn schema(section: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigSchema {
            section: section.into(),
            reason: reason.into(),
        }
    }

    /// Shortcut for the most common schema violation.
    pub fn missing_field(section: impl Into<String>, field: &str, context: &str) -> Self {
        Self::schema(
            section,
            format!("missing required field `{field}` for {context}"),
        )
    }
}
