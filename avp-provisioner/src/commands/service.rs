//! AVP Provisioner Service Layer
//!
//! The service holds the policy-store API client and exposes the provisioning
//! operations. Adapters (the CLI, deployment hooks) prepare a request from the
//! configuration, then hand it to [`ProvisioningService::execute`].

use aws_sdk_verifiedpermissions::Client as AvpClient;
use log::debug;

use crate::aws::avp_client::AwsAvpClient;
use crate::aws::PolicyStoreApi;
use crate::commands::request::OperationRequest;
use crate::config::AvpConfig;
use crate::error::ProvisionerResult;
use crate::types::{CheckFailurePolicy, Operation, OperationReport, StoreOutcome};

/// Main service struct that holds the API client and the run's policies
pub struct ProvisioningService<A = AwsAvpClient> {
    pub(crate) api: A,
    pub(crate) check_failure_policy: CheckFailurePolicy,
}

impl ProvisioningService<AwsAvpClient> {
    /// Create a service backed by Amazon Verified Permissions
    ///
    /// Credentials come from the default provider chain. The region is taken
    /// from the configuration when set, otherwise from the environment.
    pub async fn new(config: &AvpConfig) -> ProvisionerResult<Self> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = config.region() {
            debug!("Using region {region}");
            loader = loader.region(aws_config::Region::new(region.to_string()));
        }
        let sdk_config = loader.load().await;

        Ok(Self::with_api(
            AwsAvpClient::new(AvpClient::new(&sdk_config)),
            config.check_failure_policy(),
        ))
    }
}

impl<A: PolicyStoreApi> ProvisioningService<A> {
    pub fn with_api(api: A, check_failure_policy: CheckFailurePolicy) -> Self {
        Self {
            api,
            check_failure_policy,
        }
    }

    /// Run one prepared operation and summarise the outcome.
    pub async fn execute(&self, request: &OperationRequest) -> ProvisionerResult<OperationReport> {
        match request {
            OperationRequest::CreatePolicyStore(descriptor) => {
                let outcome = self.ensure_store_exists(descriptor).await?;
                Ok(store_report(&outcome))
            }
            OperationRequest::DeletePolicyStore(descriptor) => {
                let policy_store_id = self.delete_store(descriptor).await?;
                Ok(OperationReport::new(
                    Operation::DeletePolicyStore,
                    &policy_store_id,
                    true,
                    format!("Policy store deleted with ID: {policy_store_id}"),
                ))
            }
            OperationRequest::CreateStaticPolicy { descriptor, policy } => {
                let policy_id = self.attach_static_policy(descriptor, policy).await?;
                Ok(policy_report(descriptor.require_policy_store_id()?, policy_id))
            }
            OperationRequest::PutSchema { descriptor, schema } => {
                let policy_store_id = self.install_schema(descriptor, schema).await?;
                Ok(schema_report(policy_store_id))
            }
        }
    }
}

pub(crate) fn store_report(outcome: &StoreOutcome) -> OperationReport {
    let id = outcome.policy_store_id();
    let message = match outcome {
        StoreOutcome::AlreadyExists(_) => format!("Policy store with ID: {id} already exists"),
        StoreOutcome::Created(_) => format!("Policy store created with ID: {id}"),
    };
    OperationReport::new(Operation::CreatePolicyStore, id, outcome.was_created(), message)
}

pub(crate) fn policy_report(policy_store_id: &str, policy_id: String) -> OperationReport {
    OperationReport::new(
        Operation::CreateStaticPolicy,
        policy_store_id,
        true,
        format!("Static policy created with ID: {policy_id}"),
    )
    .with_policy_id(policy_id)
}

pub(crate) fn schema_report(policy_store_id: String) -> OperationReport {
    let message = format!("Schema put successfully for policy store ID: {policy_store_id}");
    OperationReport::new(Operation::PutSchema, policy_store_id, true, message)
}
