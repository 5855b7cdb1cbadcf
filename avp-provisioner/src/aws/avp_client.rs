//! Amazon Verified Permissions client wrapper for policy store operations

use async_trait::async_trait;
use aws_sdk_verifiedpermissions::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_verifiedpermissions::operation::get_policy_store::GetPolicyStoreError;
use aws_sdk_verifiedpermissions::types::{
    PolicyDefinition, SchemaDefinition, StaticPolicyDefinition,
    ValidationMode as SdkValidationMode, ValidationSettings,
};
use aws_sdk_verifiedpermissions::Client as AvpClient;
use log::debug;

use crate::aws::{AwsError, AwsResult, PolicyStoreApi};
use crate::documents::PolicyDocument;
use crate::types::ValidationMode;

pub struct AwsAvpClient {
    client: AvpClient,
}

impl AwsAvpClient {
    pub fn new(client: AvpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PolicyStoreApi for AwsAvpClient {
    async fn get_policy_store(&self, policy_store_id: &str) -> AwsResult<String> {
        debug!("GetPolicyStore {policy_store_id}");
        let response = self
            .client
            .get_policy_store()
            .policy_store_id(policy_store_id)
            .send()
            .await
            .map_err(|e| {
                let message = sdk_error_message(&e);
                if e
                    .as_service_error()
                    .is_some_and(GetPolicyStoreError::is_resource_not_found_exception)
                {
                    AwsError::NotFound(message)
                } else {
                    AwsError::Service(message)
                }
            })?;
        Ok(response.policy_store_id().to_string())
    }

    async fn create_policy_store(&self, validation_mode: ValidationMode) -> AwsResult<String> {
        debug!("CreatePolicyStore validationMode={validation_mode}");
        let settings = ValidationSettings::builder()
            .mode(to_sdk_mode(validation_mode))
            .build()
            .map_err(|e| AwsError::RequestBuild(e.to_string()))?;

        let response = self
            .client
            .create_policy_store()
            .validation_settings(settings)
            .send()
            .await
            .map_err(|e| AwsError::Service(sdk_error_message(&e)))?;
        Ok(response.policy_store_id().to_string())
    }

    async fn delete_policy_store(&self, policy_store_id: &str) -> AwsResult<()> {
        debug!("DeletePolicyStore {policy_store_id}");
        self.client
            .delete_policy_store()
            .policy_store_id(policy_store_id)
            .send()
            .await
            .map_err(|e| AwsError::Service(sdk_error_message(&e)))?;
        Ok(())
    }

    async fn create_static_policy(
        &self,
        policy_store_id: &str,
        policy: &PolicyDocument,
    ) -> AwsResult<String> {
        debug!("CreatePolicy (static) in {policy_store_id}");
        let definition = StaticPolicyDefinition::builder()
            .statement(policy.statement())
            .set_description(policy.description().map(str::to_string))
            .build()
            .map_err(|e| AwsError::RequestBuild(e.to_string()))?;

        let response = self
            .client
            .create_policy()
            .policy_store_id(policy_store_id)
            .definition(PolicyDefinition::Static(definition))
            .send()
            .await
            .map_err(|e| AwsError::Service(sdk_error_message(&e)))?;
        Ok(response.policy_id().to_string())
    }

    async fn put_schema(&self, policy_store_id: &str, cedar_json: &str) -> AwsResult<String> {
        debug!("PutSchema {policy_store_id} ({} bytes)", cedar_json.len());
        let response = self
            .client
            .put_schema()
            .policy_store_id(policy_store_id)
            .definition(SchemaDefinition::CedarJson(cedar_json.to_string()))
            .send()
            .await
            .map_err(|e| AwsError::Service(sdk_error_message(&e)))?;
        Ok(response.policy_store_id().to_string())
    }
}

fn to_sdk_mode(mode: ValidationMode) -> SdkValidationMode {
    match mode {
        ValidationMode::Off => SdkValidationMode::Off,
        ValidationMode::Strict => SdkValidationMode::Strict,
    }
}

/// `Code: message` for service errors, the full error chain otherwise
/// (dispatch failures, timeouts, credential problems).
fn sdk_error_message<E, R>(error: &SdkError<E, R>) -> String
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match (error.code(), error.message()) {
        (Some(code), Some(message)) => format!("{code}: {message}"),
        (None, Some(message)) => message.to_string(),
        _ => DisplayErrorContext(error).to_string(),
    }
}
