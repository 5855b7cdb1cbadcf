//! AWS SDK integration: the policy-store API seam and its Verified Permissions
//! implementation.

pub mod avp_client;

use async_trait::async_trait;
use thiserror::Error;

use crate::documents::PolicyDocument;
use crate::types::ValidationMode;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("{0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    RequestBuild(String),
    #[error("{0}")]
    Service(String),
}

impl AwsError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AwsError::NotFound(_))
    }
}

pub type AwsResult<T> = Result<T, AwsError>;

/// Remote calls the provisioner makes against the policy-management service.
///
/// Each method is exactly one request. Identifiers returned are the ones
/// assigned by the service.
#[async_trait]
pub trait PolicyStoreApi: Send + Sync {
    /// Resolve a policy store by ID. Fails with [`AwsError::NotFound`] when
    /// the service reports that no such store exists.
    async fn get_policy_store(&self, policy_store_id: &str) -> AwsResult<String>;

    async fn create_policy_store(&self, validation_mode: ValidationMode) -> AwsResult<String>;

    async fn delete_policy_store(&self, policy_store_id: &str) -> AwsResult<()>;

    /// Returns the new policy ID.
    async fn create_static_policy(
        &self,
        policy_store_id: &str,
        policy: &PolicyDocument,
    ) -> AwsResult<String>;

    /// Replace the store's schema. Returns the policy store ID echoed back by
    /// the service.
    async fn put_schema(&self, policy_store_id: &str, cedar_json: &str) -> AwsResult<String>;
}
