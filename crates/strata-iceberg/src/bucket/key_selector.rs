//! Bucket id extraction.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::{BucketFieldInfo, KeySelector};
use crate::error::SinkResult;
use crate::partition_key::PartitionKey;
use crate::types::{IcebergSchema, PartitionSpec, RowData, RowType};
use crate::wrapper::RowDataWrapper;

/// Extracts the bucket id of each record.
///
/// The selector is built where the write topology is planned and shipped to
/// every writer task, so it serializes without its [`RowDataWrapper`]. The
/// wrapper is built on first use at the destination and then reused; a
/// clone or a deserialized copy starts without one.
#[derive(Debug, Serialize, Deserialize)]
pub struct BucketKeySelector {
    schema: IcebergSchema,
    row_type: RowType,
    partition_key: PartitionKey,
    bucket_field_position: usize,
    #[serde(skip)]
    wrapper: OnceLock<RowDataWrapper>,
}

impl BucketKeySelector {
    /// Creates a selector for the spec's single bucket field.
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
        let info = BucketFieldInfo::from_spec(spec)?;
        let partition_key = PartitionKey::new(spec, schema)?;

        tracing::debug!(
            spec_id = spec.spec_id,
            bucket_field_id = info.field_id,
            bucket_field_position = info.position,
            num_buckets = info.num_buckets,
            "built bucket key selector"
        );

        Ok(Self {
            schema: schema.clone(),
            row_type: row_type.clone(),
            partition_key,
            bucket_field_position: info.position,
            wrapper: OnceLock::new(),
        })
    }

    /// Position of the bucket field within the partition key.
    #[must_use]
    pub fn bucket_field_position(&self) -> usize {
        self.bucket_field_position
    }

    /// Returns the row adapter, building it on first call.
    #[must_use]
    pub fn wrapper(&self) -> &RowDataWrapper {
        self.wrapper
            .get_or_init(|| RowDataWrapper::new(&self.row_type, &self.schema))
    }

    /// Returns true once the row adapter has been built.
    #[must_use]
    pub fn is_wrapper_initialized(&self) -> bool {
        self.wrapper.get().is_some()
    }

    /// Returns the bucket id of `row`, or `None` when its source value is null.
    ///
    /// # Errors
    ///
    /// Returns an error if a partition source column cannot be read or
    /// transformed.
    pub fn extract(&mut self, row: &RowData) -> SinkResult<Option<i32>> {
        let wrapper = self
            .wrapper
            .get_or_init(|| RowDataWrapper::new(&self.row_type, &self.schema));
        self.partition_key.partition(&wrapper.wrap(row))?;
        self.partition_key.get_int(self.bucket_field_position)
    }

    /// Partition path of the last extracted record.
    #[must_use]
    pub fn last_partition_path(&self) -> String {
        self.partition_key.to_path()
    }
}

impl Clone for BucketKeySelector {
    fn clone(&self) -> Self {
        Self {
            schema: self.schema.clone(),
            row_type: self.row_type.clone(),
            partition_key: self.partition_key.clone(),
            bucket_field_position: self.bucket_field_position,
            wrapper: OnceLock::new(),
        }
    }
}

impl KeySelector<RowData> for BucketKeySelector {
    type Key = Option<i32>;

    fn get_key(&mut self, value: &RowData) -> SinkResult<Self::Key> {
        self.extract(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SinkError;
    use crate::types::{
        IcebergField, IcebergPrimitiveType, LogicalType, PartitionField, RowValue, Transform,
    };

    // hash(34) = 2017239379, and 2017239379 % 60 = 19
    const BUCKET_OF_34: i32 = 19;

    fn schema() -> IcebergSchema {
        IcebergSchema::new(vec![
            IcebergField::optional(1, "id", IcebergPrimitiveType::Int),
            IcebergField::optional(2, "data", IcebergPrimitiveType::String),
        ])
    }

    fn row_type() -> RowType {
        RowType::of([("id", LogicalType::Int), ("data", LogicalType::Varchar)])
    }

    fn spec() -> PartitionSpec {
        PartitionSpec::new(
            0,
            vec![
                PartitionField::new(1000, 2, "data", Transform::Identity),
                PartitionField::new(1001, 1, "id_bucket", Transform::Bucket(60)),
            ],
        )
    }

    fn row(id: RowValue, data: &str) -> RowData {
        RowData::new(vec![id, RowValue::String(data.to_string())])
    }

    #[test]
    fn test_extract_bucket_id() {
        let mut selector = BucketKeySelector::new(&spec(), &schema(), &row_type()).unwrap();
        assert_eq!(selector.bucket_field_position(), 1);
        assert!(!selector.is_wrapper_initialized());

        let bucket = selector.extract(&row(RowValue::Int(34), "a")).unwrap();
        assert_eq!(bucket, Some(BUCKET_OF_34));
        assert!(selector.is_wrapper_initialized());
        assert_eq!(selector.last_partition_path(), "data=a/id_bucket=19");
    }

    #[test]
    fn test_null_source_yields_none() {
        let mut selector = BucketKeySelector::new(&spec(), &schema(), &row_type()).unwrap();
        assert_eq!(selector.get_key(&row(RowValue::Null, "a")).unwrap(), None);
    }

    #[test]
    fn test_extract_is_deterministic() {
        let mut selector = BucketKeySelector::new(&spec(), &schema(), &row_type()).unwrap();
        let record = row(RowValue::Int(1234), "x");
        let first = selector.extract(&record).unwrap();
        selector.extract(&row(RowValue::Int(7), "y")).unwrap();
        assert_eq!(selector.extract(&record).unwrap(), first);
    }

    #[test]
    fn test_decimal_source_column() {
        let schema = IcebergSchema::new(vec![IcebergField::optional(
            1,
            "amt",
            IcebergPrimitiveType::Decimal {
                precision: 10,
                scale: 2,
            },
        )]);
        let row_type = RowType::of([("amt", LogicalType::Decimal)]);
        let spec = PartitionSpec::new(
            0,
            vec![PartitionField::new(1000, 1, "amt_bucket", Transform::Bucket(8))],
        );

        let mut selector = BucketKeySelector::new(&spec, &schema, &row_type).unwrap();
        let row = RowData::new(vec![RowValue::Decimal {
            unscaled: 1420,
            scale: 2,
        }]);
        // hash(14.20) = -500754589
        let expected = (-500_754_589_i32 & i32::MAX) % 8;
        assert_eq!(selector.extract(&row).unwrap(), Some(expected));
        assert_eq!(selector.last_partition_path(), format!("amt_bucket={expected}"));
    }

    #[test]
    fn test_type_mismatch_surfaces() {
        let mut selector = BucketKeySelector::new(&spec(), &schema(), &row_type()).unwrap();
        let bad = RowData::new(vec![RowValue::String("34".into()), RowValue::String("a".into())]);
        let err = selector.extract(&bad).unwrap_err();
        assert!(matches!(err, SinkError::TypeMismatch { .. }));
    }

    #[test]
    fn test_rejects_spec_without_bucket() {
        let spec = PartitionSpec::new(
            0,
            vec![PartitionField::new(1000, 2, "data", Transform::Identity)],
        );
        let err = BucketKeySelector::new(&spec, &schema(), &row_type()).unwrap_err();
        assert!(matches!(err, SinkError::BucketFieldCount { count: 0 }));
    }

    #[test]
    fn test_wrapper_built_once_across_threads() {
        let owned = BucketKeySelector::new(&spec(), &schema(), &row_type()).unwrap();
        let selector = &owned;

        let addresses = std::thread::scope(|scope| {
            let handles = (0..8)
                .map(|_| scope.spawn(move || std::ptr::from_ref(selector.wrapper()) as usize))
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .collect::<Vec<_>>()
        });

        assert!(addresses.windows(2).all(|w| w[0] == w[1]));
        assert!(std::ptr::eq(selector.wrapper(), selector.wrapper()));
    }

    #[test]
    fn test_serialized_copy_rebuilds_wrapper() {
        let mut selector = BucketKeySelector::new(&spec(), &schema(), &row_type()).unwrap();
        selector.extract(&row(RowValue::Int(34), "a")).unwrap();

        let json = serde_json::to_string(&selector).unwrap();
        let mut restored: BucketKeySelector = serde_json::from_str(&json).unwrap();
        assert!(!restored.is_wrapper_initialized());
        assert_eq!(restored.extract(&row(RowValue::Int(34), "b")).unwrap(), Some(BUCKET_OF_34));

        let cloned = selector.clone();
        assert!(!cloned.is_wrapper_initialized());
    }
}
