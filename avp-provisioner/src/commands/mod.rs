//! Commands module - service layer for AVP Provisioner operations

mod policy;
mod provision;
mod request;
mod schema;
pub(crate) mod service;
mod store;

pub use request::{OperationRequest, ProvisionPlan};
pub use service::ProvisioningService;
