//! This crate provides the core logic for AVP Provisioner:
//! - Configuration loading (serverless-style manifest plus overrides)
//! - Cedar policy and schema documents
//! - Idempotent Amazon Verified Permissions operations (policy stores,
//!   schemas, static policies)
//!

mod aws;
pub mod commands;
mod config;
mod documents;
mod error;
mod types;

#[cfg(test)]
mod test_support;

// Re-exports for a small, focused public API
pub use aws::avp_client::AwsAvpClient;
pub use aws::{AwsError, AwsResult, PolicyStoreApi};
pub use commands::{OperationRequest, ProvisionPlan, ProvisioningService};
pub use config::{AvpConfig, AvpSettings};
pub use documents::{PolicyDocument, SchemaDocument};
pub use error::{ProvisionFailure, ProvisionerError, ProvisionerResult};
pub use types::{
    CheckFailurePolicy, Operation, OperationReport, ResourceDescriptor, StoreLookup, StoreOutcome,
    ValidationMode,
};
