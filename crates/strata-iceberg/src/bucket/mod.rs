//! Bucket-aware routing of records to writer tasks.
//!
//! Tables partitioned by a single `bucket[N]` field are written by routing
//! every record for a bucket to the same writer task:
//!
//! 1. [`BucketFieldInfo`] validates the partition spec once, when the write
//!    topology is built.
//! 2. [`BucketKeySelector`] extracts the bucket id of each record.
//! 3. [`BucketPartitioner`] maps the bucket id to a writer task index.
//!
//! [`BucketRouter`] composes the last two for callers that route records
//! directly.
//!
//! ## Example
//!
//! ```rust
//! use strata_iceberg::bucket::BucketPartitioner;
//! use strata_iceberg::types::{PartitionField, PartitionSpec, Transform};
//!
//! let spec = PartitionSpec::new(0, vec![
//!     PartitionField::new(1000, 1, "id_bucket", Transform::Bucket(60)),
//! ]);
//! let partitioner = BucketPartitioner::new(&spec)?;
//!
//! assert_eq!(partitioner.route(Some(42), 500)?, 42);
//! assert_eq!(partitioner.route(Some(42), 30)?, 12);
//! # Ok::<(), strata_iceberg::SinkError>(())
//! ```

mod field_info;
mod key_selector;
mod partitioner;
mod router;

pub use field_info::{BucketFieldInfo, has_one_bucket_field};
pub use key_selector::BucketKeySelector;
pub use partitioner::{BucketAssignment, BucketPartitioner, MAX_ASSIGNMENT_SIZE};
pub use router::BucketRouter;

use crate::error::SinkResult;

/// Extracts a routing key from a record.
pub trait KeySelector<T: ?Sized> {
    /// The key type.
    type Key;

    /// Returns the key of `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be computed.
    fn get_key(&mut self, value: &T) -> SinkResult<Self::Key>;
}

/// Maps a key to one of `num_partitions` downstream tasks.
pub trait Partitioner<K: ?Sized> {
    /// Returns a task index in `[0, num_partitions)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid for this partitioner.
    fn partition(&self, key: &K, num_partitions: usize) -> SinkResult<usize>;
}
