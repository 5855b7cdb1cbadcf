//! Static policy creation

use log::info;

use crate::aws::PolicyStoreApi;
use crate::documents::PolicyDocument;
use crate::error::{ProvisionerError, ProvisionerResult};
use crate::types::{Operation, ResourceDescriptor};

impl<A: PolicyStoreApi> super::service::ProvisioningService<A> {
    /// Add a static policy to the configured store and return its policy ID.
    ///
    /// The store is assumed to exist and the statement is not checked locally;
    /// syntax and schema errors come back from the service.
    pub async fn attach_static_policy(
        &self,
        descriptor: &ResourceDescriptor,
        policy: &PolicyDocument,
    ) -> ProvisionerResult<String> {
        let policy_store_id = descriptor.require_policy_store_id()?;
        let policy_id = self
            .api
            .create_static_policy(policy_store_id, policy)
            .await
            .map_err(ProvisionerError::remote(Operation::CreateStaticPolicy))?;
        info!("Static policy created with ID: {policy_id}");
        Ok(policy_id)
    }
}
