//! Policy and schema documents loaded from disk.

use std::path::Path;
use std::str::FromStr;

use crate::error::{ProvisionerError, ProvisionerResult};

/// A static Cedar policy: statement text plus an optional description, both
/// passed to the service verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDocument {
    statement: String,
    description: Option<String>,
}

impl PolicyDocument {
    pub fn new(statement: impl Into<String>, description: Option<String>) -> Self {
        Self {
            statement: statement.into(),
            description,
        }
    }

    /// Read the policy statement from a UTF-8 text file.
    pub async fn load(
        path: impl AsRef<Path>,
        description: Option<String>,
    ) -> ProvisionerResult<Self> {
        let path = path.as_ref();
        let statement = tokio::fs::read_to_string(path)
            .await
            .map_err(|error| ProvisionerError::Io {
                kind: "policy",
                path: path.to_path_buf(),
                error,
            })?;
        Ok(Self::new(statement, description))
    }

    pub fn statement(&self) -> &str {
        &self.statement
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// A Cedar JSON schema. Parsing on construction means malformed input is
/// rejected before any request is built.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    value: serde_json::Value,
}

impl SchemaDocument {
    /// Read and parse a JSON schema file.
    pub async fn load(path: impl AsRef<Path>) -> ProvisionerResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|error| ProvisionerError::Io {
                kind: "schema",
                path: path.to_path_buf(),
                error,
            })?;
        Self::parse(&raw, &format!("'{}'", path.display()))
    }

    fn parse(raw: &str, origin: &str) -> ProvisionerResult<Self> {
        serde_json::from_str(raw)
            .map(|value| Self { value })
            .map_err(|error| ProvisionerError::SchemaParse {
                origin: origin.to_string(),
                error,
            })
    }

    /// Compact JSON with object keys in sorted order.
    pub fn to_canonical_json(&self) -> String {
        // Serializing a `Value` cannot fail: keys are always strings.
        self.value.to_string()
    }
}

impl FromStr for SchemaDocument {
    type Err = ProvisionerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, "inline source")
    }
}
