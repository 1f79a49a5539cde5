//! Record to writer task routing.

use serde::{Deserialize, Serialize};

use super::{BucketKeySelector, BucketPartitioner, KeySelector, Partitioner};
use crate::error::SinkResult;
use crate::metrics;
use crate::types::{IcebergSchema, PartitionSpec, RowData, RowType};

/// Routes records straight to writer task indexes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketRouter {
    selector: BucketKeySelector,
    partitioner: BucketPartitioner,
}

impl BucketRouter {
    /// Creates a router for a table with a single bucket field.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the spec does not have exactly one
    /// bucket field or cannot be resolved against the schema.
    pub fn new(
        spec: &PartitionSpec,
        schema: &IcebergSchema,
        row_type: &RowType,
    ) -> SinkResult<Self> {
        Ok(Self {
            selector: BucketKeySelector::new(spec, schema, row_type)?,
            partitioner: BucketPartitioner::new(spec)?,
        })
    }

    /// The bucket id extractor.
    #[must_use]
    pub fn selector(&self) -> &BucketKeySelector {
        &self.selector
    }

    /// The bucket id to task mapping.
    #[must_use]
    pub fn partitioner(&self) -> &BucketPartitioner {
        &self.partitioner
    }

    /// Returns the writer task index for `row`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket id cannot be extracted, is null or out
    /// of range, or `num_tasks` is zero. Every failure is fatal for the
    /// record and is counted by reason.
    pub fn route_record(&mut self, row: &RowData, num_tasks: usize) -> SinkResult<usize> {
        let result = self
            .selector
            .get_key(row)
            .and_then(|bucket_id| self.partitioner.partition(&bucket_id, num_tasks));

        match &result {
            Ok(_) => metrics::record_routed(),
            Err(e) => {
                metrics::record_routing_error(e.reason());
                tracing::error!(error = %e, num_tasks, "failed to route record");
            }
        }
        result
    }
}
