//! Error types for AVP Provisioner operations

use std::path::PathBuf;

use thiserror::Error;

use crate::aws::AwsError;
use crate::types::{Operation, OperationReport};

/// Result type for provisioning operations
pub type ProvisionerResult<T> = Result<T, ProvisionerError>;

/// Errors surfaced by the provisioning service.
///
/// Configuration and local input problems are reported before any remote call
/// is made; remote failures carry the operation that failed so a single log
/// line is enough to tell what went wrong.
#[derive(Error, Debug)]
pub enum ProvisionerError {
    /// A configuration value was present but invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// An operation needed a configuration key that was not supplied.
    #[error("Missing required configuration value '{0}'")]
    MissingConfig(&'static str),

    /// A lifecycle hook name did not map to any operation.
    #[error("Unknown lifecycle hook '{0}'")]
    UnknownHook(String),

    /// A manifest, policy or schema file could not be read.
    #[error("Failed to read {kind} file '{path}': {error}")]
    Io {
        kind: &'static str,
        path: PathBuf,
        error: std::io::Error,
    },

    /// The configuration manifest is not valid YAML.
    #[error("Failed to parse configuration manifest '{path}': {error}")]
    Manifest {
        path: PathBuf,
        error: serde_yaml::Error,
    },

    /// The schema source did not parse as JSON.
    #[error("Failed to parse schema from {origin}: {error}")]
    SchemaParse {
        origin: String,
        error: serde_json::Error,
    },

    /// The policy store existence check failed and the configured policy
    /// refuses to create on an inconclusive lookup.
    #[error("Could not verify whether policy store '{policy_store_id}' exists: {message}")]
    ExistenceCheckFailed {
        policy_store_id: String,
        message: String,
    },

    /// The policy-management service rejected or failed a request.
    #[error("Failed to {operation}: {error}")]
    Remote { operation: Operation, error: AwsError },
}

impl ProvisionerError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub(crate) fn remote(operation: Operation) -> impl FnOnce(AwsError) -> Self {
        move |error| Self::Remote { operation, error }
    }

    /// True when the failure came from the remote service rather than from
    /// local configuration or input files.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Remote { .. } | Self::ExistenceCheckFailed { .. }
        )
    }
}

/// A provisioning sequence that stopped partway.
///
/// `completed` holds the reports of the steps that finished before `error`,
/// so a freshly created store ID is not lost when a later step fails.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct ProvisionFailure {
    pub completed: Vec<OperationReport>,
    pub error: ProvisionerError,
}

impl From<ProvisionerError> for ProvisionFailure {
    fn from(error: ProvisionerError) -> Self {
        Self {
            completed: Vec::new(),
            error,
        }
    }
}
