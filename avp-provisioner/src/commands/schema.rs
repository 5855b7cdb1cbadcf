//! Schema installation

use log::info;

use crate::aws::PolicyStoreApi;
use crate::documents::SchemaDocument;
use crate::error::{ProvisionerError, ProvisionerResult};
use crate::types::{Operation, ResourceDescriptor};

impl<A: PolicyStoreApi> super::service::ProvisioningService<A> {
    /// Replace the store's schema with the canonical form of `schema`.
    pub async fn install_schema(
        &self,
        descriptor: &ResourceDescriptor,
        schema: &SchemaDocument,
    ) -> ProvisionerResult<String> {
        let policy_store_id = descriptor.require_policy_store_id()?;
        let cedar_json = schema.to_canonical_json();
        let updated = self
            .api
            .put_schema(policy_store_id, &cedar_json)
            .await
            .map_err(ProvisionerError::remote(Operation::PutSchema))?;
        info!("Schema put successfully for policy store ID: {updated}");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use crate::commands::ProvisioningService;
    use crate::documents::SchemaDocument;
    use crate::test_support::{ApiCall, FakePolicyStoreApi};
    use crate::types::{CheckFailurePolicy, ResourceDescriptor};

    #[tokio::test]
    async fn test_schema_sent_in_canonical_form() {
        let svc = ProvisioningService::with_api(
            FakePolicyStoreApi::new().with_store("store-1"),
            CheckFailurePolicy::Create,
        );
        let schema: SchemaDocument = r#"
            {
              "App": {
                "actions": { "view": {} },
                "entityTypes": { "User": {} }
              }
            }"#
        .parse()
        .unwrap();

        let updated = svc
            .install_schema(&ResourceDescriptor::new(Some("store-1".into()), None), &schema)
            .await
            .unwrap();

        assert_eq!(updated, "store-1");
        assert_eq!(
            svc.api.calls(),
            vec![ApiCall::PutSchema {
                policy_store_id: "store-1".into(),
                cedar_json: r#"{"App":{"actions":{"view":{}},"entityTypes":{"User":{}}}}"#.into(),
            }]
        );
    }

    #[tokio::test]
    async fn test_identifier_used_unmodified() {
        let svc = ProvisioningService::with_api(
            FakePolicyStoreApi::new().with_store(" PS-Mixed_Case "),
            CheckFailurePolicy::Create,
        );
        let schema: SchemaDocument = "{}".parse().unwrap();

        svc.install_schema(
            &ResourceDescriptor::new(Some(" PS-Mixed_Case ".into()), None),
            &schema,
        )
        .await
        .unwrap();

        assert!(matches!(
            &svc.api.calls()[0],
            ApiCall::PutSchema { policy_store_id, .. } if policy_store_id == " PS-Mixed_Case "
        ));
    }
}
