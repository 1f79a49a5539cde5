//! Sink routing error types.
//!
//! Two classes of failure exist. Configuration errors are raised once while
//! the write topology is built and must stop the pipeline from starting.
//! Data errors are raised per record and are fatal for that record; they are
//! never retried because routing inputs are deterministic.
//!
//! The `Display` text of every variant is stable and matched by tests.

use thiserror::Error;

/// Result type alias for sink routing operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Message reported when a record has no bucket id.
pub const BUCKET_NULL_MESSAGE: &str = "bucket id cannot be null";

/// Sink routing error types.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The partition spec does not contain exactly one bucket transform.
    #[error("invalid partition spec: expected exactly 1 bucket transform field, found {count}")]
    BucketFieldCount {
        /// Number of bucket transform fields found.
        count: usize,
    },

    /// The partition spec is malformed for routing purposes.
    #[error("invalid partition spec: {message}")]
    InvalidPartitionSpec {
        /// Human-readable error message.
        message: String,
    },

    /// A partition transform cannot be applied to its source column type.
    #[error("transform {transform} cannot be applied to {source_type}")]
    UnsupportedTransform {
        /// The transform string (e.g., `bucket[16]`).
        transform: String,
        /// The source column type.
        source_type: String,
    },

    /// The record produced no bucket id.
    #[error("{}", BUCKET_NULL_MESSAGE)]
    NullBucketId,

    /// The bucket id is negative.
    #[error("bucket id out of range: less than lower bound (0), got {bucket_id}")]
    BucketIdBelowLowerBound {
        /// The offending bucket id.
        bucket_id: i32,
    },

    /// The bucket id is not below the declared bucket count.
    #[error("bucket id out of range: greater than upper bound ({upper_bound}), got {bucket_id}")]
    BucketIdAboveUpperBound {
        /// The offending bucket id.
        bucket_id: i32,
        /// Highest valid bucket id (declared bucket count minus one).
        upper_bound: i32,
    },

    /// Routing was requested for zero writer tasks.
    #[error("invalid number of writer tasks: must be greater than 0, got {num_tasks}")]
    InvalidParallelism {
        /// The requested number of writer tasks.
        num_tasks: usize,
    },

    /// An assignment table was requested for more buckets or tasks than it
    /// can list.
    #[error(
        "bucket assignment too large: {num_buckets} buckets over {num_tasks} tasks \
         exceeds the limit of {limit}"
    )]
    AssignmentTooLarge {
        /// Declared bucket count.
        num_buckets: i32,
        /// Requested number of writer tasks.
        num_tasks: usize,
        /// Largest bucket or task count an assignment lists.
        limit: usize,
    },

    /// A record value does not match the declared column type.
    #[error("type mismatch at position {position}: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Column or partition field position.
        position: usize,
        /// Expected type.
        expected: String,
        /// Actual value type.
        actual: String,
    },

    /// A field position is outside the row.
    #[error("field position {position} out of range for row of {size} fields")]
    FieldOutOfRange {
        /// Requested position.
        position: usize,
        /// Number of fields in the row.
        size: usize,
    },

    /// Shared configuration or serialization failure.
    #[error(transparent)]
    Core(#[from] strata_core::Error),
}

impl SinkError {
    /// Creates an invalid partition spec error.
    #[must_use]
    pub fn invalid_spec(message: impl Into<String>) -> Self {
        Self::InvalidPartitionSpec {
            message: message.into(),
        }
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(
        position: usize,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            position,
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Returns true for errors raised while building the write topology.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::BucketFieldCount { .. }
                | Self::InvalidPartitionSpec { .. }
                | Self::UnsupportedTransform { .. }
                | Self::AssignmentTooLarge { .. }
                | Self::Core(_)
        )
    }

    /// Returns true for errors raised while routing a single record.
    #[must_use]
    pub fn is_data_error(&self) -> bool {
        !self.is_configuration_error()
    }

    /// Short label used for the `reason` metric dimension.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::BucketFieldCount { .. } => "bucket_field_count",
            Self::InvalidPartitionSpec { .. } => "invalid_partition_spec",
            Self::UnsupportedTransform { .. } => "unsupported_transform",
            Self::NullBucketId => "null_bucket",
            Self::BucketIdBelowLowerBound { .. } => "below_lower_bound",
            Self::BucketIdAboveUpperBound { .. } => "above_upper_bound",
            Self::InvalidParallelism { .. } => "invalid_parallelism",
            Self::AssignmentTooLarge { .. } => "assignment_too_large",
            Self::TypeMismatch { .. } | Self::FieldOutOfRange { .. } => "extract_failed",
            Self::Core(_) => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_messages() {
        assert_eq!(SinkError::NullBucketId.to_string(), "bucket id cannot be null");
        assert_eq!(
            SinkError::BucketIdBelowLowerBound { bucket_id: -1 }.to_string(),
            "bucket id out of range: less than lower bound (0), got -1"
        );
        assert_eq!(
            SinkError::BucketIdAboveUpperBound {
                bucket_id: 60,
                upper_bound: 59
            }
            .to_string(),
            "bucket id out of range: greater than upper bound (59), got 60"
        );
        assert_eq!(
            SinkError::BucketFieldCount { count: 2 }.to_string(),
            "invalid partition spec: expected exactly 1 bucket transform field, found 2"
        );
    }

    #[test]
    fn test_error_classes() {
        assert!(SinkError::BucketFieldCount { count: 0 }.is_configuration_error());
        assert!(SinkError::invalid_spec("bucket[0]").is_configuration_error());
        assert!(SinkError::NullBucketId.is_data_error());
        assert!(SinkError::InvalidParallelism { num_tasks: 0 }.is_data_error());
        assert!(SinkError::type_mismatch(1, "int", "string").is_data_error());
    }

    #[test]
    fn test_core_error_is_transparent() {
        let err: SinkError = strata_core::Error::invalid_input("bad mode").into();
        assert_eq!(err.to_string(), "invalid input: bad mode");
        assert_eq!(err.reason(), "config");
    }
}
