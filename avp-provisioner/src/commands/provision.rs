//! Full provisioning sequence for a single policy store

use log::{info, warn};

use crate::aws::PolicyStoreApi;
use crate::commands::request::ProvisionPlan;
use crate::commands::service::{policy_report, schema_report, store_report};
use crate::error::{ProvisionFailure, ProvisionerError};
use crate::types::OperationReport;

impl<A: PolicyStoreApi> super::service::ProvisioningService<A> {
    /// Ensure the store exists, then install the schema and add the policy.
    ///
    /// The schema goes first so a STRICT store can validate the policy against
    /// it. The store ID resolved in the first step (possibly freshly created)
    /// is used for the rest. Stops at the first failure; earlier steps are not
    /// undone, and their reports are returned with the error.
    pub async fn provision(
        &self,
        plan: &ProvisionPlan,
    ) -> Result<Vec<OperationReport>, ProvisionFailure> {
        let outcome = self.ensure_store_exists(&plan.descriptor).await?;
        let descriptor = plan.descriptor.with_policy_store_id(outcome.policy_store_id());
        let mut reports = vec![store_report(&outcome)];

        if let Some(schema) = &plan.schema {
            match self.install_schema(&descriptor, schema).await {
                Ok(policy_store_id) => reports.push(schema_report(policy_store_id)),
                Err(error) => return Err(partial(reports, error)),
            }
        }

        if let Some(policy) = &plan.policy {
            match self.attach_static_policy(&descriptor, policy).await {
                Ok(policy_id) => reports.push(policy_report(outcome.policy_store_id(), policy_id)),
                Err(error) => return Err(partial(reports, error)),
            }
        }

        info!(
            "Provisioned policy store {} ({} step(s))",
            outcome.policy_store_id(),
            reports.len()
        );
        Ok(reports)
    }
}

fn partial(completed: Vec<OperationReport>, error: ProvisionerError) -> ProvisionFailure {
    warn!("Provisioning stopped after {} completed step(s)", completed.len());
    ProvisionFailure { completed, error }
}
