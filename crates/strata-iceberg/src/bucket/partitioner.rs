//! Bucket id to writer task mapping.

use serde::{Deserialize, Serialize};

use super::{BucketFieldInfo, Partitioner};
use crate::error::{SinkError, SinkResult};
use crate::types::PartitionSpec;

/// Largest bucket count or task count [`BucketPartitioner::assignment`] lists.
pub const MAX_ASSIGNMENT_SIZE: usize = 1 << 20;

/// Routes bucket ids to writer tasks.
///
/// With at least as many tasks as buckets, bucket `b` goes to task `b`, so
/// adding idle tasks beyond N never moves a bucket. With fewer tasks, buckets
/// are dealt round-robin (`b % num_tasks`) and no task holds more than one
/// bucket above any other. Both rules agree when `num_tasks == N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketPartitioner {
    max_num_buckets: i32,
}

impl BucketPartitioner {
    /// Creates a partitioner for the spec's single bucket field.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the spec does not have exactly one
    /// valid bucket transform field.
    pub fn new(spec: &PartitionSpec) -> SinkResult<Self> {
        Ok(Self::from_field_info(&BucketFieldInfo::from_spec(spec)?))
    }

    /// Creates a partitioner from already validated bucket field facts.
    #[must_use]
    pub fn from_field_info(info: &BucketFieldInfo) -> Self {
        Self {
            max_num_buckets: info.num_buckets,
        }
    }

    /// Declared bucket count N.
    #[must_use]
    pub fn num_buckets(&self) -> i32 {
        self.max_num_buckets
    }

    /// Returns the writer task index for a bucket id.
    ///
    /// # Errors
    ///
    /// Checked in order: a missing bucket id, a negative bucket id, a bucket
    /// id not below N, and zero writer tasks.
    pub fn route(&self, bucket_id: Option<i32>, num_tasks: usize) -> SinkResult<usize> {
        let bucket_id = bucket_id.ok_or(SinkError::NullBucketId)?;
        let Ok(bucket) = usize::try_from(bucket_id) else {
            return Err(SinkError::BucketIdBelowLowerBound { bucket_id });
        };
        if bucket_id >= self.max_num_buckets {
            return Err(SinkError::BucketIdAboveUpperBound {
                bucket_id,
                upper_bound: self.max_num_buckets - 1,
            });
        }
        if num_tasks == 0 {
            return Err(SinkError::InvalidParallelism { num_tasks });
        }

        // max_num_buckets > bucket_id >= 0, so the conversion cannot fail.
        let num_buckets = usize::try_from(self.max_num_buckets).unwrap_or(usize::MAX);
        if num_tasks >= num_buckets {
            Ok(bucket)
        } else {
            Ok(bucket % num_tasks)
        }
    }

    /// Computes which buckets each task receives for a parallelism.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::InvalidParallelism`] if `num_tasks` is zero and
    /// [`SinkError::AssignmentTooLarge`] if the bucket count or `num_tasks`
    /// exceeds [`MAX_ASSIGNMENT_SIZE`].
    pub fn assignment(&self, num_tasks: usize) -> SinkResult<BucketAssignment> {
        if num_tasks == 0 {
            return Err(SinkError::InvalidParallelism { num_tasks });
        }
        let num_buckets = usize::try_from(self.max_num_buckets).unwrap_or(usize::MAX);
        if num_buckets > MAX_ASSIGNMENT_SIZE || num_tasks > MAX_ASSIGNMENT_SIZE {
            return Err(SinkError::AssignmentTooLarge {
                num_buckets: self.max_num_buckets,
                num_tasks,
                limit: MAX_ASSIGNMENT_SIZE,
            });
        }

        let mut tasks = vec![Vec::new(); num_tasks];
        for bucket_id in 0..self.max_num_buckets {
            let task = self.route(Some(bucket_id), num_tasks)?;
            tasks[task].push(bucket_id);
        }

        Ok(BucketAssignment {
            num_buckets: self.max_num_buckets,
            tasks,
        })
    }
}

impl Partitioner<Option<i32>> for BucketPartitioner {
    fn partition(&self, key: &Option<i32>, num_partitions: usize) -> SinkResult<usize> {
        self.route(*key, num_partitions)
    }
}

/// Task to bucket table for one parallelism.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketAssignment {
    /// Declared bucket count.
    pub num_buckets: i32,
    /// Buckets per task, indexed by task.
    pub tasks: Vec<Vec<i32>>,
}

impl BucketAssignment {
    /// Number of writer tasks.
    #[must_use]
    pub fn num_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Buckets routed to `task`; empty for idle or unknown tasks.
    #[must_use]
    pub fn buckets_for(&self, task: usize) -> &[i32] {
        self.tasks.get(task).map_or(&[], Vec::as_slice)
    }

    /// Tasks that receive no bucket.
    #[must_use]
    pub fn idle_tasks(&self) -> Vec<usize> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, buckets)| buckets.is_empty())
            .map(|(task, _)| task)
            .collect()
    }

    /// Largest difference in bucket count between any two tasks.
    #[must_use]
    pub fn max_skew(&self) -> usize {
        let max = self.tasks.iter().map(Vec::len).max().unwrap_or(0);
        let min = self.tasks.iter().map(Vec::len).min().unwrap_or(0);
        max - min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partitioner(num_buckets: i32) -> BucketPartitioner {
        BucketPartitioner::from_field_info(&BucketFieldInfo {
            field_id: 1000,
            position: 0,
            num_buckets,
        })
    }

    #[test]
    fn test_more_tasks_than_buckets_is_identity() {
        let p = partitioner(60);
        for bucket in 0..60 {
            assert_eq!(p.route(Some(bucket), 500).unwrap(), bucket as usize);
        }
    }

    #[test]
    fn test_fewer_tasks_than_buckets_is_round_robin() {
        let p = partitioner(60);
        for bucket in 0..60 {
            assert_eq!(p.route(Some(bucket), 30).unwrap(), bucket as usize % 30);
        }
    }

    #[test]
    fn test_boundary_branches_agree() {
        let p = partitioner(7);
        for bucket in 0..7 {
            let at_boundary = p.route(Some(bucket), 7).unwrap();
            assert_eq!(at_boundary, bucket as usize);
            assert_eq!(at_boundary, bucket as usize % 7);
        }
    }

    #[test]
    fn test_single_task_takes_everything() {
        let p = partitioner(60);
        for bucket in 0..60 {
            assert_eq!(p.route(Some(bucket), 1).unwrap(), 0);
        }
    }

    #[test]
    fn test_route_errors_in_order() {
        let p = partitioner(60);

        let err = p.route(None, 0).unwrap_err();
        assert_eq!(err.to_string(), "bucket id cannot be null");

        let err = p.route(Some(-1), 1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "bucket id out of range: less than lower bound (0), got -1"
        );

        let err = p.route(Some(60), 1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "bucket id out of range: greater than upper bound (59), got 60"
        );

        let err = p.route(Some(-1), 0).unwrap_err();
        assert!(matches!(err, SinkError::BucketIdBelowLowerBound { bucket_id: -1 }));

        let err = p.route(Some(0), 0).unwrap_err();
        assert!(matches!(err, SinkError::InvalidParallelism { num_tasks: 0 }));
    }

    #[test]
    fn test_partitioner_trait_delegates() {
        let p = partitioner(4);
        assert_eq!(Partitioner::partition(&p, &Some(3), 2).unwrap(), 1);
        assert!(Partitioner::partition(&p, &None, 2).is_err());
    }

    #[test]
    fn test_assignment_fewer_tasks() {
        let assignment = partitioner(10).assignment(4).unwrap();
        assert_eq!(assignment.buckets_for(0), &[0, 4, 8]);
        assert_eq!(assignment.buckets_for(1), &[1, 5, 9]);
        assert_eq!(assignment.buckets_for(2), &[2, 6]);
        assert_eq!(assignment.buckets_for(3), &[3, 7]);
        assert_eq!(assignment.max_skew(), 1);
        assert!(assignment.idle_tasks().is_empty());
    }

    #[test]
    fn test_assignment_more_tasks() {
        let assignment = partitioner(3).assignment(5).unwrap();
        assert_eq!(assignment.num_tasks(), 5);
        assert_eq!(assignment.buckets_for(2), &[2]);
        assert_eq!(assignment.idle_tasks(), vec![3, 4]);
        assert!(assignment.buckets_for(42).is_empty());
    }

    #[test]
    fn test_assignment_rejects_zero_tasks() {
        assert!(partitioner(3).assignment(0).is_err());
    }

    #[test]
    fn test_assignment_rejects_oversized_tables() {
        let err = partitioner(60).assignment(1_000_000_000_000).unwrap_err();
        assert_eq!(
            err.to_string(),
            "bucket assignment too large: 60 buckets over 1000000000000 tasks \
             exceeds the limit of 1048576"
        );
        assert!(err.is_configuration_error());

        let err = partitioner(i32::MAX).assignment(4).unwrap_err();
        assert!(matches!(
            err,
            SinkError::AssignmentTooLarge {
                num_buckets: i32::MAX,
                num_tasks: 4,
                ..
            }
        ));

        // Routing itself has no such limit.
        assert_eq!(partitioner(i32::MAX).route(Some(i32::MAX - 1), 4).unwrap(), 2);
        let at_limit = partitioner(4).assignment(MAX_ASSIGNMENT_SIZE).unwrap();
        assert_eq!(at_limit.num_tasks(), MAX_ASSIGNMENT_SIZE);
    }
}
