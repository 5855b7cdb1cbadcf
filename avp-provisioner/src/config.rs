//! Configuration loading for the provisioner
//!
//! Settings come from an optional serverless-style manifest and are then
//! overridden by explicit values (CLI flags or environment variables):
//! ```yaml
//! provider:
//!   region: us-east-1
//! custom:
//!   avp:
//!     policyStoreId: PSEXAMPLEabcdefg111111
//!     validationMode: STRICT
//!     policyPath: policies/allow_all.cedar
//!     policyDescription: allow all
//!     schemaPath: schema/schema.json
//! ```
//!
//! The merged settings are validated once into an immutable [`AvpConfig`],
//! which is passed explicitly to every operation.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ProvisionerError, ProvisionerResult};
use crate::types::{CheckFailurePolicy, ResourceDescriptor, ValidationMode};

/// Raw, unvalidated settings. Every field is optional; later sources win on
/// [`AvpSettings::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvpSettings {
    #[serde(default)]
    pub policy_store_id: Option<String>,
    #[serde(default)]
    pub validation_mode: Option<String>,
    #[serde(default)]
    pub policy_path: Option<PathBuf>,
    #[serde(default)]
    pub policy_description: Option<String>,
    #[serde(default)]
    pub schema_path: Option<PathBuf>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub on_check_failure: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerlessManifest {
    #[serde(default)]
    provider: ProviderSection,
    #[serde(default)]
    custom: CustomSection,
}

#[derive(Debug, Default, Deserialize)]
struct ProviderSection {
    #[serde(default)]
    region: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CustomSection {
    #[serde(default)]
    avp: Option<AvpSettings>,
}

impl AvpSettings {
    /// Load settings from a serverless-style manifest (`provider.region` and
    /// `custom.avp.*`). Relative file paths resolve against the manifest's
    /// directory.
    pub async fn from_manifest(path: impl AsRef<Path>) -> ProvisionerResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|error| ProvisionerError::Io {
                kind: "configuration",
                path: path.to_path_buf(),
                error,
            })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_manifest_str(&raw, base_dir).map_err(|error| ProvisionerError::Manifest {
            path: path.to_path_buf(),
            error,
        })
    }

    fn from_manifest_str(raw: &str, base_dir: &Path) -> Result<Self, serde_yaml::Error> {
        let manifest: ServerlessManifest = serde_yaml::from_str(raw)?;
        let mut settings = manifest.custom.avp.unwrap_or_default();
        if settings.region.is_none() {
            settings.region = manifest.provider.region;
        }
        settings.policy_path = settings.policy_path.map(|p| base_dir.join(p));
        settings.schema_path = settings.schema_path.map(|p| base_dir.join(p));
        Ok(settings)
    }

    /// Overlay `overrides` on top of `self`; any value present in `overrides`
    /// replaces the current one.
    #[must_use]
    pub fn merge(self, overrides: AvpSettings) -> Self {
        Self {
            policy_store_id: overrides.policy_store_id.or(self.policy_store_id),
            validation_mode: overrides.validation_mode.or(self.validation_mode),
            policy_path: overrides.policy_path.or(self.policy_path),
            policy_description: overrides.policy_description.or(self.policy_description),
            schema_path: overrides.schema_path.or(self.schema_path),
            region: overrides.region.or(self.region),
            on_check_failure: overrides.on_check_failure.or(self.on_check_failure),
        }
    }
}

/// Validated, immutable configuration for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvpConfig {
    policy_store_id: Option<String>,
    validation_mode: Option<ValidationMode>,
    policy_path: Option<PathBuf>,
    policy_description: Option<String>,
    schema_path: Option<PathBuf>,
    region: Option<String>,
    check_failure_policy: CheckFailurePolicy,
}

impl TryFrom<AvpSettings> for AvpConfig {
    type Error = ProvisionerError;

    fn try_from(settings: AvpSettings) -> ProvisionerResult<Self> {
        let validation_mode = non_empty(settings.validation_mode)
            .map(|mode| mode.parse::<ValidationMode>())
            .transpose()?;
        let check_failure_policy = non_empty(settings.on_check_failure)
            .map(|policy| policy.parse::<CheckFailurePolicy>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            // An empty identifier means "no store yet", same as an absent one.
            policy_store_id: non_empty(settings.policy_store_id),
            validation_mode,
            policy_path: settings.policy_path.filter(|p| !p.as_os_str().is_empty()),
            policy_description: settings.policy_description,
            schema_path: settings.schema_path.filter(|p| !p.as_os_str().is_empty()),
            region: non_empty(settings.region),
            check_failure_policy,
        })
    }
}

impl AvpConfig {
    pub fn policy_store_id(&self) -> Option<&str> {
        self.policy_store_id.as_deref()
    }

    pub fn validation_mode(&self) -> Option<ValidationMode> {
        self.validation_mode
    }

    pub fn policy_path(&self) -> Option<&Path> {
        self.policy_path.as_deref()
    }

    pub fn policy_description(&self) -> Option<&str> {
        self.policy_description.as_deref()
    }

    pub fn schema_path(&self) -> Option<&Path> {
        self.schema_path.as_deref()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn check_failure_policy(&self) -> CheckFailurePolicy {
        self.check_failure_policy
    }

    pub fn descriptor(&self) -> ResourceDescriptor {
        ResourceDescriptor::new(self.policy_store_id.clone(), self.validation_mode)
    }

    pub fn require_policy_store_id(&self) -> ProvisionerResult<&str> {
        self.policy_store_id()
            .ok_or(ProvisionerError::MissingConfig("policyStoreId"))
    }

    pub fn require_policy_path(&self) -> ProvisionerResult<&Path> {
        self.policy_path()
            .ok_or(ProvisionerError::MissingConfig("policyPath"))
    }

    pub fn require_schema_path(&self) -> ProvisionerResult<&Path> {
        self.schema_path()
            .ok_or(ProvisionerError::MissingConfig("schemaPath"))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
