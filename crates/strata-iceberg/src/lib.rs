//! # strata-iceberg
//!
//! Bucket-aware record routing for Iceberg sink writers.
//!
//! Tables partitioned by a single `bucket[N]` transform are written most
//! efficiently when every record of a bucket reaches the same writer task.
//! This crate provides the pieces a streaming sink needs for that:
//!
//! - **Types**: Iceberg schema and partition spec metadata, engine rows
//! - **Partition keys**: Iceberg transforms (including bucket hashing)
//!   evaluated against engine rows
//! - **Bucket routing**: spec validation, bucket id extraction and the
//!   bucket id to writer task mapping
//! - **Distribution**: choosing a shuffle strategy from table properties
//!
//! ## Example
//!
//! ```rust
//! use strata_iceberg::prelude::*;
//!
//! let schema = IcebergSchema::new(vec![
//!     IcebergField::required(1, "id", IcebergPrimitiveType::Long),
//!     IcebergField::optional(2, "data", IcebergPrimitiveType::String),
//! ]);
//! let spec = PartitionSpec::new(0, vec![
//!     PartitionField::new(1000, 1, "id_bucket", Transform::Bucket(8)),
//! ]);
//! let row_type = RowType::of([("id", LogicalType::BigInt), ("data", LogicalType::Varchar)]);
//!
//! let mut router = BucketRouter::new(&spec, &schema, &row_type)?;
//! let row = RowData::new(vec![RowValue::BigInt(34), RowValue::String("a".into())]);
//! assert_eq!(router.route_record(&row, 100)?, 3);
//! # Ok::<(), SinkError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod bucket;
pub mod config;
pub mod distribution;
pub mod error;
pub mod hash;
pub mod metrics;
pub mod partition_key;
pub mod transform;
pub mod types;
pub mod wrapper;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bucket::{
        BucketAssignment, BucketFieldInfo, BucketKeySelector, BucketPartitioner, BucketRouter,
        KeySelector, Partitioner,
    };
    pub use crate::config::SinkConfig;
    pub use crate::distribution::{Distribution, DistributionMode, plan_distribution};
    pub use crate::error::{SinkError, SinkResult};
    pub use crate::types::{
        IcebergField, IcebergPrimitiveType, IcebergSchema, LogicalType, PartitionField,
        PartitionSpec, RowData, RowType, RowValue, Transform,
    };
}

pub use error::{SinkError, SinkResult};
