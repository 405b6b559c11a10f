//! Maps provider metadata documents into [CanonicalMetadata].
//!
//! Each provider declares a static [ProviderMapping] next to its detector. The
//! mapping locates the provider's object inside the document, coerces every
//! mapped native value to a string and applies the field [Transform].
use crate::cloud::aws::metadata::AWS_MAPPING;
use crate::cloud::azure::metadata::AZURE_MAPPING;
use crate::cloud::gcp::metadata::GCP_MAPPING;
use crate::config::MissingFieldPolicy;
use crate::metadata::{CanonicalField, CanonicalMetadata, Provider};
use serde_json::{Map, Value};

const UNDEFINED: &str = "undefined";

/// Post-processing applied to a coerced native value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transform {
    Identity,
    /// `projects/1234/zones/us-west1-b` -> `us-west1-b`
    LastPathSegment,
    /// `projects/1234/zones/us-west1-b` -> `us-west1`
    RegionFromZone,
    /// `projects/1234/zones/us-west1-b` -> `1234`, `None` when there is no project segment.
    ProjectNumber,
}

impl Transform {
    fn apply(self, value: String) -> Option<String> {
        match self {
            Transform::Identity => Some(value),
            Transform::LastPathSegment => Some(last_path_segment(&value).to_string()),
            Transform::RegionFromZone => {
                let zone = last_path_segment(&value);
                Some(
                    zone.rsplit_once('-')
                        .map(|(region, _)| region)
                        .unwrap_or_default()
                        .to_string(),
                )
            }
            Transform::ProjectNumber => {
                let mut segments = value.split('/');
                while let Some(segment) = segments.next() {
                    if segment == "projects" {
                        return segments
                            .next()
                            .filter(|number| !number.is_empty())
                            .map(str::to_string);
                    }
                }
                None
            }
        }
    }
}

fn last_path_segment(value: &str) -> &str {
    value.rsplit('/').next().unwrap_or(value)
}

/// One canonical field and the native key it is read from.
#[derive(Debug)]
pub(crate) struct FieldMapping {
    pub(crate) field: CanonicalField,
    pub(crate) source: &'static str,
    pub(crate) transform: Transform,
}

impl FieldMapping {
    pub(crate) const fn new(field: CanonicalField, source: &'static str) -> Self {
        Self {
            field,
            source,
            transform: Transform::Identity,
        }
    }

    pub(crate) const fn with_transform(self, transform: Transform) -> Self {
        Self { transform, ..self }
    }
}

/// Static description of a provider document.
#[derive(Debug)]
pub(crate) struct ProviderMapping {
    /// Key of the object holding the mapped fields, the document itself when `None`.
    pub(crate) root: Option<&'static str>,
    /// Key that must be present for the document to belong to the provider.
    pub(crate) marker: Option<&'static str>,
    pub(crate) fields: &'static [FieldMapping],
}

impl ProviderMapping {
    /// Returns the object holding the provider fields, `None` when the document
    /// does not belong to this provider.
    fn locate<'a>(&self, document: &'a Value) -> Option<&'a Map<String, Value>> {
        let object = match self.root {
            Some(root) => document.get(root)?,
            None => document,
        }
        .as_object()?;

        match self.marker {
            Some(marker) if !object.contains_key(marker) => None,
            _ => Some(object),
        }
    }
}

pub(crate) fn mapping_for(provider: Provider) -> &'static ProviderMapping {
    match provider {
        Provider::Aws => &AWS_MAPPING,
        Provider::Gcp => &GCP_MAPPING,
        Provider::Azure => &AZURE_MAPPING,
    }
}

/// Returns whether `document` has the shape of the provider's metadata document.
pub fn is_provider_document(provider: Provider, document: &Value) -> bool {
    mapping_for(provider).locate(document).is_some()
}

/// Normalizes `document` with the default [MissingFieldPolicy].
pub fn normalize(provider: Provider, document: &Value) -> CanonicalMetadata {
    normalize_with(provider, document, MissingFieldPolicy::default())
}

/// Normalizes a provider metadata document.
///
/// Documents that do not belong to `provider` produce the default metadata,
/// with every field and the provider unset.
pub fn normalize_with(
    provider: Provider,
    document: &Value,
    missing_fields: MissingFieldPolicy,
) -> CanonicalMetadata {
    let mapping = mapping_for(provider);
    let Some(object) = mapping.locate(document) else {
        return CanonicalMetadata::default();
    };

    let mut metadata = CanonicalMetadata::for_provider(provider);
    for field_mapping in mapping.fields {
        let value = match object.get(field_mapping.source) {
            // the sentinel is never transformed
            None => missing(missing_fields),
            Some(value) => coerce(value, missing_fields)
                .and_then(|value| field_mapping.transform.apply(value)),
        };
        metadata.set(field_mapping.field, value);
    }
    metadata
}

fn missing(missing_fields: MissingFieldPolicy) -> Option<String> {
    match missing_fields {
        MissingFieldPolicy::Undefined => Some(UNDEFINED.to_string()),
        MissingFieldPolicy::Null => None,
    }
}

fn coerce(value: &Value, missing_fields: MissingFieldPolicy) -> Option<String> {
    match (value, missing_fields) {
        (Value::Null, MissingFieldPolicy::Null) => None,
        (Value::String(value), _) => Some(value.clone()),
        // numbers, booleans, null and nested values keep their JSON text
        (value, _) => Some(value.to_string()),
    }
}
