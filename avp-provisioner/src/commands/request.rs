//! Turning configuration into ready-to-run requests.
//!
//! Everything local happens here: required keys are checked and policy/schema
//! files are read and parsed. A request that prepares successfully only has
//! remote calls left to make.

use log::debug;

use crate::config::AvpConfig;
use crate::documents::{PolicyDocument, SchemaDocument};
use crate::error::ProvisionerResult;
use crate::types::{Operation, ResourceDescriptor};

#[derive(Debug, Clone, PartialEq)]
pub enum OperationRequest {
    CreatePolicyStore(ResourceDescriptor),
    DeletePolicyStore(ResourceDescriptor),
    CreateStaticPolicy {
        descriptor: ResourceDescriptor,
        policy: PolicyDocument,
    },
    PutSchema {
        descriptor: ResourceDescriptor,
        schema: SchemaDocument,
    },
}

impl OperationRequest {
    pub async fn prepare(operation: Operation, config: &AvpConfig) -> ProvisionerResult<Self> {
        let descriptor = config.descriptor();
        match operation {
            Operation::CreatePolicyStore => {
                // Without an ID the store will certainly be created, so the
                // mode is needed up front.
                if descriptor.policy_store_id.is_none() {
                    descriptor.require_validation_mode()?;
                }
                Ok(Self::CreatePolicyStore(descriptor))
            }
            Operation::DeletePolicyStore => {
                descriptor.require_policy_store_id()?;
                Ok(Self::DeletePolicyStore(descriptor))
            }
            Operation::CreateStaticPolicy => {
                descriptor.require_policy_store_id()?;
                let policy = load_policy(config).await?;
                Ok(Self::CreateStaticPolicy { descriptor, policy })
            }
            Operation::PutSchema => {
                descriptor.require_policy_store_id()?;
                let schema = SchemaDocument::load(config.require_schema_path()?).await?;
                Ok(Self::PutSchema { descriptor, schema })
            }
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Self::CreatePolicyStore(_) => Operation::CreatePolicyStore,
            Self::DeletePolicyStore(_) => Operation::DeletePolicyStore,
            Self::CreateStaticPolicy { .. } => Operation::CreateStaticPolicy,
            Self::PutSchema { .. } => Operation::PutSchema,
        }
    }
}

/// The full create-store, put-schema, create-policy sequence. Schema and
/// policy steps are included only when their paths are configured.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionPlan {
    pub descriptor: ResourceDescriptor,
    pub schema: Option<SchemaDocument>,
    pub policy: Option<PolicyDocument>,
}

impl ProvisionPlan {
    pub async fn prepare(config: &AvpConfig) -> ProvisionerResult<Self> {
        let descriptor = config.descriptor();
        if descriptor.policy_store_id.is_none() {
            descriptor.require_validation_mode()?;
        }

        let schema = match config.schema_path() {
            Some(path) => Some(SchemaDocument::load(path).await?),
            None => None,
        };
        let policy = match config.policy_path() {
            Some(_) => Some(load_policy(config).await?),
            None => None,
        };

        if schema.is_none() && policy.is_none() {
            debug!("No schemaPath or policyPath configured; provisioning the store only");
        }

        Ok(Self {
            descriptor,
            schema,
            policy,
        })
    }
}

async fn load_policy(config: &AvpConfig) -> ProvisionerResult<PolicyDocument> {
    let path = config.require_policy_path()?;
    let description = config.policy_description().map(str::to_string);
    PolicyDocument::load(path, description).await
}
