//! Reading engine rows as Iceberg structs.
//!
//! [`RowDataWrapper`] pairs an engine [`RowType`] with the table
//! [`IcebergSchema`] and converts each column into its Iceberg
//! representation on read. The per-column converters are boxed closures,
//! so the wrapper cannot be serialized; components that travel between
//! workers build it lazily at their destination.

use std::fmt;

use crate::error::{SinkError, SinkResult};
use crate::types::{
    IcebergPrimitiveType, IcebergSchema, Literal, LogicalType, RowData, RowType, RowValue,
};

/// Positional read access to a struct of Iceberg values.
pub trait StructLike {
    /// Number of fields.
    fn size(&self) -> usize;

    /// Returns the value at `pos`, or `None` for null.
    ///
    /// # Errors
    ///
    /// Returns an error if `pos` is out of range or the underlying value
    /// cannot be represented as the declared Iceberg type.
    fn get(&self, pos: usize) -> SinkResult<Option<Literal>>;
}

impl StructLike for [Option<Literal>] {
    fn size(&self) -> usize {
        self.len()
    }

    fn get(&self, pos: usize) -> SinkResult<Option<Literal>> {
        <[Option<Literal>]>::get(self, pos)
            .cloned()
            .ok_or(SinkError::FieldOutOfRange {
                position: pos,
                size: self.len(),
            })
    }
}

type FieldGetter = Box<dyn Fn(usize, &RowValue) -> SinkResult<Option<Literal>> + Send + Sync>;

/// Converts engine rows to Iceberg values, column by column.
pub struct RowDataWrapper {
    getters: Vec<FieldGetter>,
}

impl RowDataWrapper {
    /// Builds converters for every top-level schema column.
    ///
    /// Incompatible column pairs do not fail here; reading a non-null value
    /// from such a column reports a type mismatch.
    #[must_use]
    pub fn new(row_type: &RowType, schema: &IcebergSchema) -> Self {
        let getters = schema
            .fields
            .iter()
            .enumerate()
            .map(|(pos, field)| {
                let logical = row_type.fields.get(pos).map(|f| f.logical_type);
                match (field.field_type.as_primitive(), logical) {
                    (Some(primitive), Some(logical)) => getter_for(primitive, logical),
                    (_, logical) => {
                        let expected = field.field_type.to_string();
                        let actual =
                            logical.map_or_else(|| "missing".to_string(), |l| l.to_string());
                        incompatible(expected, actual)
                    }
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(columns = getters.len(), "row data wrapper built");
        Self { getters }
    }

    /// Wraps a row for reading. No values are copied until read.
    #[must_use]
    pub fn wrap<'a>(&'a self, row: &'a RowData) -> WrappedRow<'a> {
        WrappedRow { wrapper: self, row }
    }
}

impl fmt::Debug for RowDataWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowDataWrapper")
            .field("columns", &self.getters.len())
            .finish()
    }
}

/// A row viewed through a [`RowDataWrapper`].
#[derive(Debug, Clone, Copy)]
pub struct WrappedRow<'a> {
    wrapper: &'a RowDataWrapper,
    row: &'a RowData,
}

impl StructLike for WrappedRow<'_> {
    fn size(&self) -> usize {
        self.wrapper.getters.len()
    }

    fn get(&self, pos: usize) -> SinkResult<Option<Literal>> {
        let getter = self.wrapper.getters.get(pos).ok_or(SinkError::FieldOutOfRange {
            position: pos,
            size: self.wrapper.getters.len(),
        })?;
        let value = self.row.get(pos).ok_or(SinkError::FieldOutOfRange {
            position: pos,
            size: self.row.arity(),
        })?;
        getter(pos, value)
    }
}

fn mismatch(pos: usize, expected: &str, value: &RowValue) -> SinkError {
    SinkError::type_mismatch(pos, expected, value.type_name())
}

fn incompatible(expected: String, actual: String) -> FieldGetter {
    Box::new(move |pos: usize, value: &RowValue| match value {
        RowValue::Null => Ok(None),
        _ => Err(SinkError::type_mismatch(pos, expected.clone(), actual.clone())),
    })
}

#[allow(clippy::too_many_lines)]
fn getter_for(primitive: &IcebergPrimitiveType, logical: LogicalType) -> FieldGetter {
    use IcebergPrimitiveType as P;
    use LogicalType as L;

    match (primitive, logical) {
        (P::Boolean, L::Boolean) => Box::new(|pos: usize, value: &RowValue| match value {
            RowValue::Null => Ok(None),
            RowValue::Boolean(v) => Ok(Some(Literal::Boolean(*v))),
            other => Err(mismatch(pos, "BOOLEAN", other)),
        }),
        (P::Int, L::TinyInt | L::SmallInt | L::Int) => {
            Box::new(|pos: usize, value: &RowValue| match value {
                RowValue::Null => Ok(None),
                RowValue::TinyInt(v) => Ok(Some(Literal::Int(i32::from(*v)))),
                RowValue::SmallInt(v) => Ok(Some(Literal::Int(i32::from(*v)))),
                RowValue::Int(v) => Ok(Some(Literal::Int(*v))),
                other => Err(mismatch(pos, "INT", other)),
            })
        }
        (P::Long, L::TinyInt | L::SmallInt | L::Int | L::BigInt) => {
            Box::new(|pos: usize, value: &RowValue| match value {
                RowValue::Null => Ok(None),
                RowValue::TinyInt(v) => Ok(Some(Literal::Long(i64::from(*v)))),
                RowValue::SmallInt(v) => Ok(Some(Literal::Long(i64::from(*v)))),
                RowValue::Int(v) => Ok(Some(Literal::Long(i64::from(*v)))),
                RowValue::BigInt(v) => Ok(Some(Literal::Long(*v))),
                other => Err(mismatch(pos, "BIGINT", other)),
            })
        }
        (P::Float, L::Float) => Box::new(|pos: usize, value: &RowValue| match value {
            RowValue::Null => Ok(None),
            RowValue::Float(v) => Ok(Some(Literal::Float(*v))),
            other => Err(mismatch(pos, "FLOAT", other)),
        }),
        (P::Double, L::Float | L::Double) => Box::new(|pos: usize, value: &RowValue| match value {
            RowValue::Null => Ok(None),
            RowValue::Float(v) => Ok(Some(Literal::Double(f64::from(*v)))),
            RowValue::Double(v) => Ok(Some(Literal::Double(*v))),
            other => Err(mismatch(pos, "DOUBLE", other)),
        }),
        (P::String, L::Varchar) => Box::new(|pos: usize, value: &RowValue| match value {
            RowValue::Null => Ok(None),
            RowValue::String(v) => Ok(Some(Literal::String(v.clone()))),
            other => Err(mismatch(pos, "VARCHAR", other)),
        }),
        (P::Binary | P::Fixed(_) | P::Uuid, L::Binary) => {
            Box::new(|pos: usize, value: &RowValue| match value {
                RowValue::Null => Ok(None),
                RowValue::Binary(v) => Ok(Some(Literal::Binary(v.clone()))),
                other => Err(mismatch(pos, "BINARY", other)),
            })
        }
        (P::Date, L::Date) => Box::new(|pos: usize, value: &RowValue| match value {
            RowValue::Null => Ok(None),
            RowValue::Date(days) => Ok(Some(Literal::Date(*days))),
            other => Err(mismatch(pos, "DATE", other)),
        }),
        (P::Time, L::Time) => Box::new(|pos: usize, value: &RowValue| match value {
            RowValue::Null => Ok(None),
            RowValue::Time(millis) => Ok(Some(Literal::Time(i64::from(*millis) * 1_000))),
            other => Err(mismatch(pos, "TIME", other)),
        }),
        (P::Timestamp | P::Timestamptz, L::Timestamp) => {
            Box::new(|pos: usize, value: &RowValue| match value {
                RowValue::Null => Ok(None),
                RowValue::Timestamp {
                    millis,
                    nanos_of_milli,
                } => {
                    let micros = millis
                        .checked_mul(1_000)
                        .and_then(|m| m.checked_add(i64::from(*nanos_of_milli / 1_000)))
                        .ok_or_else(|| mismatch(pos, "TIMESTAMP in microsecond range", value))?;
                    Ok(Some(Literal::Timestamp(micros)))
                }
                other => Err(mismatch(pos, "TIMESTAMP", other)),
            })
        }
        (P::Decimal { precision, scale }, L::Decimal) => decimal_getter(*precision, *scale),
        (primitive, logical) => incompatible(primitive.to_string(), logical.to_string()),
    }
}

fn decimal_getter(precision: u8, scale: u8) -> FieldGetter {
    let expected = IcebergPrimitiveType::Decimal { precision, scale }.to_string();
    // None above 38 digits, where every i128 fits.
    let limit = 10_u128.checked_pow(u32::from(precision));

    Box::new(move |pos: usize, value: &RowValue| match value {
        RowValue::Null => Ok(None),
        RowValue::Decimal {
            unscaled,
            scale: actual,
        } => {
            if *actual != scale {
                return Err(SinkError::type_mismatch(
                    pos,
                    expected.clone(),
                    format!("DECIMAL with scale {actual}"),
                ));
            }
            if limit.is_some_and(|limit| unscaled.unsigned_abs() >= limit) {
                return Err(SinkError::type_mismatch(
                    pos,
                    expected.clone(),
                    format!("DECIMAL with more than {precision} digits"),
                ));
            }
            Ok(Some(Literal::Decimal {
                unscaled: *unscaled,
                scale,
            }))
        }
        other => Err(mismatch(pos, &expected, other)),
    })
}
