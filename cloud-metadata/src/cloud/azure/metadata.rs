use crate::metadata::CanonicalField;
use crate::normalizer::{FieldMapping, ProviderMapping};

pub(crate) static AZURE_MAPPING: ProviderMapping = ProviderMapping {
    root: Some("compute"),
    marker: None,
    fields: &[
        FieldMapping::new(CanonicalField::AccountId, "subscriptionId"),
        FieldMapping::new(CanonicalField::InstanceId, "vmId"),
        FieldMapping::new(CanonicalField::InstanceName, "name"),
        FieldMapping::new(CanonicalField::ProjectName, "resourceGroupName"),
        FieldMapping::new(CanonicalField::AvailabilityZone, "zone"),
        FieldMapping::new(CanonicalField::MachineType, "vmSize"),
        FieldMapping::new(CanonicalField::Region, "location"),
    ],
};
