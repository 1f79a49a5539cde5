//! Reusable partition key computation.
//!
//! A [`PartitionKey`] is built once per writer from the table's partition
//! spec and schema, then recomputed in place for every record. Each call to
//! [`PartitionKey::partition`] overwrites every slot, so values from a
//! previous record are never observed.

use serde::{Deserialize, Serialize};

use crate::error::{SinkError, SinkResult};
use crate::transform;
use crate::types::{IcebergSchema, Literal, PartitionSpec, Transform};
use crate::wrapper::StructLike;

/// One resolved partition field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FieldAccessor {
    name: String,
    source_position: usize,
    transform: Transform,
}

/// Partition tuple for one record, plus the plan to compute it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionKey {
    accessors: Vec<FieldAccessor>,
    values: Vec<Option<Literal>>,
}

impl PartitionKey {
    /// Resolves every partition field against the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if a source column is missing or not a top-level
    /// primitive, a transform does not apply to its source type, or a
    /// bucket count / truncate width is outside `1..=i32::MAX`.
    pub fn new(spec: &PartitionSpec, schema: &IcebergSchema) -> SinkResult<Self> {
        let accessors = spec
            .fields
            .iter()
            .map(|field| {
                let source_position = schema.field_position(field.source_id).ok_or_else(|| {
                    SinkError::invalid_spec(format!(
                        "source field {} of partition field '{}' not found in schema",
                        field.source_id, field.name
                    ))
                })?;
                let source = &schema.fields[source_position];
                let primitive = source.field_type.as_primitive().ok_or_else(|| {
                    SinkError::invalid_spec(format!(
                        "partition field '{}' has non-primitive source '{}'",
                        field.name, source.name
                    ))
                })?;

                if let Transform::Bucket(n) | Transform::Truncate(n) = field.transform {
                    if n == 0 || i32::try_from(n).is_err() {
                        return Err(SinkError::invalid_spec(format!(
                            "partition field '{}' has invalid transform {}",
                            field.name, field.transform
                        )));
                    }
                }
                if !field.transform.can_transform(primitive) {
                    return Err(SinkError::UnsupportedTransform {
                        transform: field.transform.to_string(),
                        source_type: primitive.to_string(),
                    });
                }

                Ok(FieldAccessor {
                    name: field.name.clone(),
                    source_position,
                    transform: field.transform.clone(),
                })
            })
            .collect::<SinkResult<Vec<_>>>()?;

        let values = vec![None; accessors.len()];
        Ok(Self { accessors, values })
    }

    /// Recomputes the key from a record, overwriting every slot.
    ///
    /// # Errors
    ///
    /// Returns an error if a source value cannot be read or transformed.
    /// On error the key contents are unspecified until the next successful call.
    pub fn partition<S: StructLike + ?Sized>(&mut self, row: &S) -> SinkResult<()> {
        let slots = self.accessors.iter().zip(self.values.iter_mut());
        for (pos, (accessor, slot)) in slots.enumerate() {
            let source = row.get(accessor.source_position)?;
            *slot = transform::apply(&accessor.transform, pos, source.as_ref())?;
        }
        Ok(())
    }

    /// Number of partition fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true for an unpartitioned key.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value at a partition field position.
    #[must_use]
    pub fn get(&self, pos: usize) -> Option<&Literal> {
        self.values.get(pos).and_then(Option::as_ref)
    }

    /// Returns the `int` value at a partition field position.
    ///
    /// # Errors
    ///
    /// Returns an error if the position is out of range or the value is not
    /// an `int`.
    pub fn get_int(&self, pos: usize) -> SinkResult<Option<i32>> {
        match self.values.get(pos) {
            None => Err(SinkError::FieldOutOfRange {
                position: pos,
                size: self.values.len(),
            }),
            Some(None) => Ok(None),
            Some(Some(Literal::Int(v))) => Ok(Some(*v)),
            Some(Some(other)) => Err(SinkError::type_mismatch(pos, "int", other.type_name())),
        }
    }

    /// Renders the key as a Hive-style path (`name=value/...`).
    ///
    /// Nulls render as `null`.
    #[must_use]
    pub fn to_path(&self) -> String {
        self.accessors
            .iter()
            .zip(&self.values)
            .map(|(accessor, value)| match value {
                Some(v) => format!("{}={v}", accessor.name),
                None => format!("{}=null", accessor.name),
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}
