//! Shared types: operations, validation settings, lookup outcomes and reports.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ProvisionerError;

/// One of the four operations the provisioner can run against a policy store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operation {
    #[serde(rename = "create-store")]
    CreatePolicyStore,
    #[serde(rename = "delete-store")]
    DeletePolicyStore,
    #[serde(rename = "create-policy")]
    CreateStaticPolicy,
    #[serde(rename = "put-schema")]
    PutSchema,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::CreatePolicyStore,
        Operation::DeletePolicyStore,
        Operation::CreateStaticPolicy,
        Operation::PutSchema,
    ];

    /// Lifecycle hook name this operation is bound to in deployment pipelines.
    pub fn hook(self) -> &'static str {
        match self {
            Operation::CreatePolicyStore => "createPolicyStore:create",
            Operation::DeletePolicyStore => "deletePolicyStore:delete",
            Operation::CreateStaticPolicy => "createStaticPolicy:create",
            Operation::PutSchema => "putSchema:put",
        }
    }

    /// Resolve a lifecycle hook name to its operation.
    pub fn from_hook(hook: &str) -> Result<Self, ProvisionerError> {
        Self::ALL
            .into_iter()
            .find(|op| op.hook() == hook.trim())
            .ok_or_else(|| ProvisionerError::UnknownHook(hook.to_string()))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Operation::CreatePolicyStore => "create policy store",
            Operation::DeletePolicyStore => "delete policy store",
            Operation::CreateStaticPolicy => "create static policy",
            Operation::PutSchema => "put schema",
        };
        f.write_str(text)
    }
}

/// Store-level setting controlling how strictly policies are checked against
/// the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidationMode {
    Off,
    Strict,
}

impl FromStr for ValidationMode {
    type Err = ProvisionerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "OFF" => Ok(ValidationMode::Off),
            "STRICT" => Ok(ValidationMode::Strict),
            other => Err(ProvisionerError::config(format!(
                "validationMode must be OFF or STRICT, got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationMode::Off => f.write_str("OFF"),
            ValidationMode::Strict => f.write_str("STRICT"),
        }
    }
}

/// What to do when the existence check for a configured policy store fails
/// for a reason other than "not found".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CheckFailurePolicy {
    /// Treat the store as missing and create a new one.
    #[default]
    Create,
    /// Stop and report the failed check.
    Abort,
}

impl FromStr for CheckFailurePolicy {
    type Err = ProvisionerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "create" => Ok(CheckFailurePolicy::Create),
            "abort" => Ok(CheckFailurePolicy::Abort),
            other => Err(ProvisionerError::config(format!(
                "onCheckFailure must be 'create' or 'abort', got '{other}'"
            ))),
        }
    }
}

/// Identifies the target policy store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub policy_store_id: Option<String>,
    pub validation_mode: Option<ValidationMode>,
}

impl ResourceDescriptor {
    pub fn new(policy_store_id: Option<String>, validation_mode: Option<ValidationMode>) -> Self {
        Self {
            policy_store_id,
            validation_mode,
        }
    }

    pub fn require_policy_store_id(&self) -> Result<&str, ProvisionerError> {
        self.policy_store_id
            .as_deref()
            .ok_or(ProvisionerError::MissingConfig("policyStoreId"))
    }

    pub fn require_validation_mode(&self) -> Result<ValidationMode, ProvisionerError> {
        self.validation_mode
            .ok_or(ProvisionerError::MissingConfig("validationMode"))
    }

    /// Same validation mode, pointed at a known store.
    #[must_use]
    pub fn with_policy_store_id(&self, policy_store_id: impl Into<String>) -> Self {
        Self {
            policy_store_id: Some(policy_store_id.into()),
            validation_mode: self.validation_mode,
        }
    }
}

/// Outcome of resolving a policy store identifier against the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLookup {
    Found(String),
    NotFound,
    CheckFailed(String),
}

/// Result of ensuring a policy store exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    AlreadyExists(String),
    Created(String),
}

impl StoreOutcome {
    pub fn policy_store_id(&self) -> &str {
        match self {
            StoreOutcome::AlreadyExists(id) | StoreOutcome::Created(id) => id,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, StoreOutcome::Created(_))
    }
}

/// Summary of a successful operation, suitable for logs and JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationReport {
    pub operation: Operation,
    pub hook: &'static str,
    pub policy_store_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,
    pub changed: bool,
    pub message: String,
}

impl OperationReport {
    pub(crate) fn new(
        operation: Operation,
        policy_store_id: impl Into<String>,
        changed: bool,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            hook: operation.hook(),
            policy_store_id: policy_store_id.into(),
            policy_id: None,
            changed,
            message: message.into(),
        }
    }

    pub(crate) fn with_policy_id(mut self, policy_id: impl Into<String>) -> Self {
        self.policy_id = Some(policy_id.into());
        self
    }
}
