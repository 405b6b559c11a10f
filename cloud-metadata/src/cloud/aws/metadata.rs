use crate::metadata::CanonicalField;
use crate::normalizer::{FieldMapping, ProviderMapping};

/// Fields read from the instance identity document.
pub(crate) static AWS_MAPPING: ProviderMapping = ProviderMapping {
    root: None,
    marker: Some("instanceId"),
    fields: &[
        FieldMapping::new(CanonicalField::AccountId, "accountId"),
        FieldMapping::new(CanonicalField::InstanceId, "instanceId"),
        FieldMapping::new(CanonicalField::AvailabilityZone, "availabilityZone"),
        FieldMapping::new(CanonicalField::MachineType, "instanceType"),
        FieldMapping::new(CanonicalField::Region, "region"),
    ],
};
