//! One-time validation of the bucket partition field.

use serde::{Deserialize, Serialize};

use crate::error::{SinkError, SinkResult};
use crate::types::{PartitionSpec, Transform};

/// Facts about the single `bucket[N]` field of a partition spec.
///
/// Immutable once computed; shared freely by selectors and partitioners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketFieldInfo {
    /// Partition field id of the bucket field.
    pub field_id: i32,
    /// Ordinal position of the bucket field within the spec.
    pub position: usize,
    /// Declared bucket count N.
    pub num_buckets: i32,
}

impl BucketFieldInfo {
    /// Validates that `spec` has exactly one bucket transform field.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::BucketFieldCount`] when zero or several bucket
    /// fields exist, and [`SinkError::InvalidPartitionSpec`] when a bucket
    /// transform cannot be parsed or its count is not in `1..=i32::MAX`.
    pub fn from_spec(spec: &PartitionSpec) -> SinkResult<Self> {
        if let Some(field) = spec.fields.iter().find(|f| is_malformed_bucket(&f.transform)) {
            return Err(SinkError::invalid_spec(format!(
                "malformed bucket transform {} on partition field '{}'",
                field.transform, field.name
            )));
        }

        let bucket_fields = spec
            .fields
            .iter()
            .enumerate()
            .filter_map(|(position, field)| {
                field
                    .transform
                    .bucket_count()
                    .map(|n| (position, field.field_id, n))
            })
            .collect::<Vec<_>>();

        let [(position, field_id, declared)] = bucket_fields[..] else {
            return Err(SinkError::BucketFieldCount {
                count: bucket_fields.len(),
            });
        };

        let num_buckets = i32::try_from(declared)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                SinkError::invalid_spec(format!(
                    "bucket field {field_id} declares {declared} buckets; expected 1..={}",
                    i32::MAX
                ))
            })?;

        Ok(Self {
            field_id,
            position,
            num_buckets,
        })
    }
}

/// Returns true if `spec` has exactly one bucket transform field.
#[must_use]
pub fn has_one_bucket_field(spec: &PartitionSpec) -> bool {
    spec.fields
        .iter()
        .filter(|f| f.transform.bucket_count().is_some() || is_malformed_bucket(&f.transform))
        .count()
        == 1
}

/// `bucket[-5]` and `bucket[x]` parse as unknown transforms.
fn is_malformed_bucket(transform: &Transform) -> bool {
    match transform {
        Transform::Unknown(name) => name.trim().to_ascii_lowercase().starts_with("bucket["),
        _ => false,
    }
}
