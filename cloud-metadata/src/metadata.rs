//! Canonical cloud metadata shared by every provider.
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// Cloud providers whose metadata servers can be probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Aws,
    Gcp,
    Azure,
}

impl Provider {
    /// Every supported provider, in the order auto-detection schedules them.
    pub const ALL: [Provider; 3] = [Provider::Aws, Provider::Gcp, Provider::Azure];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Aws => "aws",
            Provider::Gcp => "gcp",
            Provider::Azure => "azure",
        }
    }
}

impl Display for Provider {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("unknown cloud provider `{0}`")]
pub struct UnknownProviderError(String);

impl FromStr for Provider {
    type Err = UnknownProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aws" => Ok(Provider::Aws),
            "gcp" => Ok(Provider::Gcp),
            "azure" => Ok(Provider::Azure),
            _ => Err(UnknownProviderError(s.to_string())),
        }
    }
}

/// Canonical fields a provider document can be mapped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CanonicalField {
    AccountId,
    InstanceId,
    InstanceName,
    ProjectName,
    AvailabilityZone,
    MachineType,
    Region,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Account {
    id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Instance {
    id: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Project {
    name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Machine {
    #[serde(rename = "type")]
    machine_type: Option<String>,
}

/// Provider-agnostic description of the instance the process runs on.
///
/// The serialized shape never changes: every key is present and values the
/// provider did not expose are `null`. The default value is the "unknown"
/// object returned when a metadata server answered but is not the probed
/// provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalMetadata {
    account: Account,
    instance: Instance,
    project: Project,
    availability_zone: Option<String>,
    machine: Machine,
    provider: Option<Provider>,
    region: Option<String>,
}

impl CanonicalMetadata {
    pub(crate) fn for_provider(provider: Provider) -> Self {
        Self {
            provider: Some(provider),
            ..Default::default()
        }
    }

    pub(crate) fn set(&mut self, field: CanonicalField, value: Option<String>) {
        let slot = match field {
            CanonicalField::AccountId => &mut self.account.id,
            CanonicalField::InstanceId => &mut self.instance.id,
            CanonicalField::InstanceName => &mut self.instance.name,
            CanonicalField::ProjectName => &mut self.project.name,
            CanonicalField::AvailabilityZone => &mut self.availability_zone,
            CanonicalField::MachineType => &mut self.machine.machine_type,
            CanonicalField::Region => &mut self.region,
        };
        *slot = value;
    }

    /// The detected provider, `None` when no provider matched.
    pub fn provider(&self) -> Option<Provider> {
        self.provider
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account.id.as_deref()
    }

    pub fn instance_id(&self) -> Option<&str> {
        self.instance.id.as_deref()
    }

    pub fn instance_name(&self) -> Option<&str> {
        self.instance.name.as_deref()
    }

    pub fn project_name(&self) -> Option<&str> {
        self.project.name.as_deref()
    }

    pub fn availability_zone(&self) -> Option<&str> {
        self.availability_zone.as_deref()
    }

    pub fn machine_type(&self) -> Option<&str> {
        self.machine.machine_type.as_deref()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }
}
