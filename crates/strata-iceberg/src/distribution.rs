//! Write distribution planning.
//!
//! Decides how records are shuffled in front of the writer tasks, based on
//! the table's `write.distribution-mode` and its partition spec.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bucket::{BucketRouter, has_one_bucket_field};
use crate::error::SinkResult;
use crate::types::{IcebergSchema, PartitionSpec, RowType};

/// Table property holding the distribution mode.
pub const WRITE_DISTRIBUTION_MODE: &str = "write.distribution-mode";

/// Requested record distribution in front of the writers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionMode {
    /// Records stay on the task that produced them.
    #[default]
    None,
    /// Records are shuffled by partition.
    Hash,
    /// Records are range-partitioned by sort order.
    Range,
}

impl DistributionMode {
    /// Iceberg property value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Hash => "hash",
            Self::Range => "range",
        }
    }
}

impl fmt::Display for DistributionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistributionMode {
    type Err = strata_core::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "hash" => Ok(Self::Hash),
            "range" => Ok(Self::Range),
            other => Err(strata_core::Error::invalid_input(format!(
                "{WRITE_DISTRIBUTION_MODE} must be one of none, hash, range (got {other})"
            ))),
        }
    }
}

/// How records reach the writer tasks.
#[derive(Debug, Clone)]
pub enum Distribution {
    /// No shuffle.
    Forward,
    /// Shuffle by bucket id.
    Bucket(Box<BucketRouter>),
    /// Shuffle by the full partition key.
    KeyByPartition,
}

impl Distribution {
    /// Short name for logs and CLI output.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Bucket(_) => "bucket",
            Self::KeyByPartition => "key-by-partition",
        }
    }
}

/// Plans the distribution for a table.
///
/// Hash mode uses bucket routing only when the spec has exactly one bucket
/// field; otherwise records are keyed by their whole partition. Range mode
/// is not supported and falls back with a warning.
///
/// # Errors
///
/// Returns a configuration error if bucket routing is chosen but the spec
/// cannot be resolved against the schema.
pub fn plan_distribution(
    mode: DistributionMode,
    spec: &PartitionSpec,
    schema: &IcebergSchema,
    row_type: &RowType,
) -> SinkResult<Distribution> {
    let distribution = match mode {
        DistributionMode::None => Distribution::Forward,
        DistributionMode::Hash if spec.is_unpartitioned() => Distribution::Forward,
        DistributionMode::Hash if has_one_bucket_field(spec) => {
            Distribution::Bucket(Box::new(BucketRouter::new(spec, schema, row_type)?))
        }
        DistributionMode::Hash => Distribution::KeyByPartition,
        DistributionMode::Range => {
            let fallback = if spec.is_unpartitioned() {
                Distribution::Forward
            } else {
                Distribution::KeyByPartition
            };
            tracing::warn!(
                fallback = fallback.name(),
                "range distribution is not supported; falling back"
            );
            fallback
        }
    };

    tracing::debug!(
        mode = %mode,
        spec_id = spec.spec_id,
        distribution = distribution.name(),
        "planned write distribution"
    );
    Ok(distribution)
}
