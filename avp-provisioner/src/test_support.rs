//! In-memory `PolicyStoreApi` that records every call.

use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::aws::{AwsError, AwsResult, PolicyStoreApi};
use crate::documents::PolicyDocument;
use crate::types::ValidationMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ApiCall {
    GetPolicyStore(String),
    CreatePolicyStore(ValidationMode),
    DeletePolicyStore(String),
    CreateStaticPolicy {
        policy_store_id: String,
        statement: String,
        description: Option<String>,
    },
    PutSchema {
        policy_store_id: String,
        cedar_json: String,
    },
}

#[derive(Default)]
pub(crate) struct FakePolicyStoreApi {
    stores: Mutex<BTreeSet<String>>,
    calls: Mutex<Vec<ApiCall>>,
    lookup_error: Option<String>,
    create_error: Option<String>,
    schema_error: Option<String>,
    created: Mutex<usize>,
}

impl FakePolicyStoreApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_store(self, policy_store_id: &str) -> Self {
        self.stores
            .lock()
            .unwrap()
            .insert(policy_store_id.to_string());
        self
    }

    /// Every lookup fails with a non-"not found" error.
    pub(crate) fn failing_lookup(mut self, message: &str) -> Self {
        self.lookup_error = Some(message.to_string());
        self
    }

    pub(crate) fn failing_create(mut self, message: &str) -> Self {
        self.create_error = Some(message.to_string());
        self
    }

    pub(crate) fn failing_schema(mut self, message: &str) -> Self {
        self.schema_error = Some(message.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn create_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ApiCall::CreatePolicyStore(_)))
            .count()
    }

    pub(crate) fn has_store(&self, policy_store_id: &str) -> bool {
        self.stores.lock().unwrap().contains(policy_store_id)
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn require_store(&self, policy_store_id: &str) -> AwsResult<()> {
        if self.has_store(policy_store_id) {
            Ok(())
        } else {
            Err(not_found(policy_store_id))
        }
    }
}

fn not_found(policy_store_id: &str) -> AwsError {
    AwsError::NotFound(format!(
        "ResourceNotFoundException: Policy store {policy_store_id} not found"
    ))
}

#[async_trait]
impl PolicyStoreApi for FakePolicyStoreApi {
    async fn get_policy_store(&self, policy_store_id: &str) -> AwsResult<String> {
        self.record(ApiCall::GetPolicyStore(policy_store_id.to_string()));
        if let Some(message) = &self.lookup_error {
            return Err(AwsError::Service(message.clone()));
        }
        self.require_store(policy_store_id)?;
        Ok(policy_store_id.to_string())
    }

    async fn create_policy_store(&self, validation_mode: ValidationMode) -> AwsResult<String> {
        self.record(ApiCall::CreatePolicyStore(validation_mode));
        if let Some(message) = &self.create_error {
            return Err(AwsError::Service(message.clone()));
        }
        let mut created = self.created.lock().unwrap();
        *created += 1;
        let id = format!("store-new-{created}");
        self.stores.lock().unwrap().insert(id.clone());
        Ok(id)
    }

    async fn delete_policy_store(&self, policy_store_id: &str) -> AwsResult<()> {
        self.record(ApiCall::DeletePolicyStore(policy_store_id.to_string()));
        if self.stores.lock().unwrap().remove(policy_store_id) {
            Ok(())
        } else {
            Err(not_found(policy_store_id))
        }
    }

    async fn create_static_policy(
        &self,
        policy_store_id: &str,
        policy: &PolicyDocument,
    ) -> AwsResult<String> {
        self.record(ApiCall::CreateStaticPolicy {
            policy_store_id: policy_store_id.to_string(),
            statement: policy.statement().to_string(),
            description: policy.description().map(str::to_string),
        });
        self.require_store(policy_store_id)?;
        Ok(format!("policy-{}", self.calls().len()))
    }

    async fn put_schema(&self, policy_store_id: &str, cedar_json: &str) -> AwsResult<String> {
        self.record(ApiCall::PutSchema {
            policy_store_id: policy_store_id.to_string(),
            cedar_json: cedar_json.to_string(),
        });
        if let Some(message) = &self.schema_error {
            return Err(AwsError::Service(message.clone()));
        }
        self.require_store(policy_store_id)?;
        Ok(policy_store_id.to_string())
    }
}
