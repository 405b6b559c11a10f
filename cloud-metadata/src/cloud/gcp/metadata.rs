use crate::metadata::CanonicalField;
use crate::normalizer::{FieldMapping, ProviderMapping, Transform};

/// `machineType` and `zone` are resource paths such as
/// `projects/123456789101/zones/us-west1-b`; the project number is only
/// exposed through them.
pub(crate) static GCP_MAPPING: ProviderMapping = ProviderMapping {
    root: None,
    marker: Some("id"),
    fields: &[
        FieldMapping::new(CanonicalField::AccountId, "zone").with_transform(Transform::ProjectNumber),
        FieldMapping::new(CanonicalField::InstanceId, "id"),
        FieldMapping::new(CanonicalField::InstanceName, "name"),
        FieldMapping::new(CanonicalField::AvailabilityZone, "zone")
            .with_transform(Transform::LastPathSegment),
        FieldMapping::new(CanonicalField::MachineType, "machineType")
            .with_transform(Transform::LastPathSegment),
        FieldMapping::new(CanonicalField::Region, "zone").with_transform(Transform::RegionFromZone),
    ],
};
