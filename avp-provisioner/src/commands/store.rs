//! Policy store lifecycle: idempotent create and unconditional delete

use log::{info, warn};

use crate::aws::PolicyStoreApi;
use crate::error::{ProvisionerError, ProvisionerResult};
use crate::types::{CheckFailurePolicy, Operation, ResourceDescriptor, StoreLookup, StoreOutcome};

impl<A: PolicyStoreApi> super::service::ProvisioningService<A> {
    /// Resolve a policy store ID, separating "does not exist" from "could not
    /// tell".
    pub async fn lookup_store(&self, policy_store_id: &str) -> StoreLookup {
        match self.api.get_policy_store(policy_store_id).await {
            Ok(found) => StoreLookup::Found(found),
            Err(e) if e.is_not_found() => StoreLookup::NotFound,
            Err(e) => StoreLookup::CheckFailed(e.to_string()),
        }
    }

    /// Create the policy store unless the configured ID already resolves.
    ///
    /// At most one create call is made. An inconclusive lookup follows the
    /// service's [`CheckFailurePolicy`].
    pub async fn ensure_store_exists(
        &self,
        descriptor: &ResourceDescriptor,
    ) -> ProvisionerResult<StoreOutcome> {
        if let Some(policy_store_id) = descriptor.policy_store_id.as_deref() {
            match self.lookup_store(policy_store_id).await {
                StoreLookup::Found(existing) => {
                    info!("Policy store with ID: {existing} already exists");
                    return Ok(StoreOutcome::AlreadyExists(existing));
                }
                StoreLookup::NotFound => {
                    info!("Policy store with ID: {policy_store_id} does not exist.");
                }
                StoreLookup::CheckFailed(message) => match self.check_failure_policy {
                    CheckFailurePolicy::Create => {
                        warn!(
                            "Could not verify policy store with ID: {policy_store_id} ({message}); creating a new one"
                        );
                    }
                    CheckFailurePolicy::Abort => {
                        return Err(ProvisionerError::ExistenceCheckFailed {
                            policy_store_id: policy_store_id.to_string(),
                            message,
                        });
                    }
                },
            }
        }

        let validation_mode = descriptor.require_validation_mode()?;
        let created = self
            .api
            .create_policy_store(validation_mode)
            .await
            .map_err(ProvisionerError::remote(Operation::CreatePolicyStore))?;
        info!("Policy store created with ID: {created}");
        Ok(StoreOutcome::Created(created))
    }

    /// Delete the configured policy store. No existence check: deleting a
    /// missing store is reported as a failure.
    pub async fn delete_store(&self, descriptor: &ResourceDescriptor) -> ProvisionerResult<String> {
        let policy_store_id = descriptor.require_policy_store_id()?;
        self.api
            .delete_policy_store(policy_store_id)
            .await
            .map_err(ProvisionerError::remote(Operation::DeletePolicyStore))?;
        info!("Policy store deleted with ID: {policy_store_id}");
        Ok(policy_store_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use crate::commands::ProvisioningService;
    use crate::error::ProvisionerError;
    use crate::test_support::{ApiCall, FakePolicyStoreApi};
    use crate::types::{
        CheckFailurePolicy, ResourceDescriptor, StoreLookup, StoreOutcome, ValidationMode,
    };

    fn descriptor(id: Option<&str>, mode: Option<ValidationMode>) -> ResourceDescriptor {
        ResourceDescriptor::new(id.map(str::to_string), mode)
    }

    #[tokio::test]
    async fn test_existing_store_is_not_recreated() {
        let svc = ProvisioningService::with_api(
            FakePolicyStoreApi::new().with_store("store-1"),
            CheckFailurePolicy::Create,
        );

        let outcome = svc
            .ensure_store_exists(&descriptor(Some("store-1"), Some(ValidationMode::Strict)))
            .await
            .unwrap();

        assert_eq!(outcome, StoreOutcome::AlreadyExists("store-1".into()));
        assert_eq!(svc.api.create_calls(), 0);
        assert_eq!(svc.api.calls(), vec![ApiCall::GetPolicyStore("store-1".into())]);
    }

    #[tokio::test]
    async fn test_existing_store_needs_no_validation_mode() {
        let svc = ProvisioningService::with_api(
            FakePolicyStoreApi::new().with_store("store-1"),
            CheckFailurePolicy::Create,
        );
        let outcome = svc
            .ensure_store_exists(&descriptor(Some("store-1"), None))
            .await
            .unwrap();
        assert_eq!(outcome.policy_store_id(), "store-1");
    }

    #[tokio::test]
    async fn test_absent_id_creates_exactly_once_with_mode() {
        let svc =
            ProvisioningService::with_api(FakePolicyStoreApi::new(), CheckFailurePolicy::Create);

        let outcome = svc
            .ensure_store_exists(&descriptor(None, Some(ValidationMode::Strict)))
            .await
            .unwrap();

        assert_eq!(outcome, StoreOutcome::Created("store-new-1".into()));
        assert!(outcome.was_created());
        assert_eq!(
            svc.api.calls(),
            vec![ApiCall::CreatePolicyStore(ValidationMode::Strict)]
        );
    }

    #[tokio::test]
    async fn test_unknown_id_creates_new_store() {
        let svc =
            ProvisioningService::with_api(FakePolicyStoreApi::new(), CheckFailurePolicy::Abort);

        let outcome = svc
            .ensure_store_exists(&descriptor(Some("store-gone"), Some(ValidationMode::Off)))
            .await
            .unwrap();

        assert_eq!(outcome, StoreOutcome::Created("store-new-1".into()));
        assert_eq!(
            svc.api.calls(),
            vec![
                ApiCall::GetPolicyStore("store-gone".into()),
                ApiCall::CreatePolicyStore(ValidationMode::Off),
            ]
        );
    }

    #[tokio::test]
    async fn test_check_failure_creates_under_create_policy() {
        let svc = ProvisioningService::with_api(
            FakePolicyStoreApi::new().failing_lookup("ThrottlingException: Rate exceeded"),
            CheckFailurePolicy::Create,
        );

        assert_eq!(
            svc.lookup_store("store-1").await,
            StoreLookup::CheckFailed("ThrottlingException: Rate exceeded".into())
        );

        let outcome = svc
            .ensure_store_exists(&descriptor(Some("store-1"), Some(ValidationMode::Strict)))
            .await
            .unwrap();
        assert!(outcome.was_created());
        assert_eq!(svc.api.create_calls(), 1);
    }

    #[tokio::test]
    async fn test_check_failure_aborts_under_abort_policy() {
        let svc = ProvisioningService::with_api(
            FakePolicyStoreApi::new().failing_lookup("ThrottlingException: Rate exceeded"),
            CheckFailurePolicy::Abort,
        );

        let err = svc
            .ensure_store_exists(&descriptor(Some("store-1"), Some(ValidationMode::Strict)))
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisionerError::ExistenceCheckFailed { .. }));
        assert!(err.is_remote());
        assert_eq!(svc.api.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_create_failure_carries_service_message() {
        let svc = ProvisioningService::with_api(
            FakePolicyStoreApi::new().failing_create("ServiceQuotaExceededException: Too many stores"),
            CheckFailurePolicy::Create,
        );

        let err = svc
            .ensure_store_exists(&descriptor(None, Some(ValidationMode::Off)))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to create policy store: ServiceQuotaExceededException: Too many stores"
        );
        assert_eq!(svc.api.create_calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_mode_fails_without_create_call() {
        let svc =
            ProvisioningService::with_api(FakePolicyStoreApi::new(), CheckFailurePolicy::Create);
        let err = svc
            .ensure_store_exists(&descriptor(None, None))
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionerError::MissingConfig("validationMode")));
        assert!(svc.api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_existing_store() {
        let svc = ProvisioningService::with_api(
            FakePolicyStoreApi::new().with_store("store-1"),
            CheckFailurePolicy::Create,
        );
        let deleted = svc
            .delete_store(&descriptor(Some("store-1"), None))
            .await
            .unwrap();
        assert_eq!(deleted, "store-1");
        assert!(!svc.api.has_store("store-1"));
    }

    #[tokio::test]
    async fn test_delete_missing_store_is_single_call_and_failure() {
        let svc =
            ProvisioningService::with_api(FakePolicyStoreApi::new(), CheckFailurePolicy::Create);

        let err = svc
            .delete_store(&descriptor(Some("store-404"), None))
            .await
            .unwrap_err();

        assert!(err.is_remote());
        assert!(err
            .to_string()
            .starts_with("Failed to delete policy store: ResourceNotFoundException"));
        assert_eq!(
            svc.api.calls(),
            vec![ApiCall::DeletePolicyStore("store-404".into())]
        );
    }
}
