//! Engine-side row representation.
//!
//! Rows arrive from the streaming engine in its own encodings (timestamps as
//! epoch millis plus nanos-of-milli, times as millis-of-day). They are read
//! through [`RowDataWrapper`](crate::wrapper::RowDataWrapper), never mutated.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Engine logical column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalType {
    /// Boolean.
    Boolean,
    /// 8-bit integer.
    TinyInt,
    /// 16-bit integer.
    SmallInt,
    /// 32-bit integer.
    Int,
    /// 64-bit integer.
    BigInt,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// Character string.
    Varchar,
    /// Byte string.
    Binary,
    /// Days since epoch.
    Date,
    /// Milliseconds of day.
    Time,
    /// Millisecond timestamp with nanosecond remainder.
    Timestamp,
    /// Fixed-point decimal.
    Decimal,
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Boolean => "BOOLEAN",
            Self::TinyInt => "TINYINT",
            Self::SmallInt => "SMALLINT",
            Self::Int => "INT",
            Self::BigInt => "BIGINT",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Varchar => "VARCHAR",
            Self::Binary => "BINARY",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Decimal => "DECIMAL",
        };
        f.write_str(name)
    }
}

/// A named column in a row type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowField {
    /// Column name.
    pub name: String,
    /// Column type.
    pub logical_type: LogicalType,
}

/// Engine row type: the columns of every [`RowData`] in a stream, in order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RowType {
    /// Columns in position order.
    pub fields: Vec<RowField>,
}

impl RowType {
    /// Creates a row type from `(name, type)` pairs.
    #[must_use]
    pub fn of<N: Into<String>>(fields: impl IntoIterator<Item = (N, LogicalType)>) -> Self {
        Self {
            fields: fields
                .into_iter()
                .map(|(name, logical_type)| RowField {
                    name: name.into(),
                    logical_type,
                })
                .collect(),
        }
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the row type has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A single engine value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RowValue {
    /// SQL null.
    Null,
    /// Boolean.
    Boolean(bool),
    /// 8-bit integer.
    TinyInt(i8),
    /// 16-bit integer.
    SmallInt(i16),
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    BigInt(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// Character string.
    String(String),
    /// Byte string.
    Binary(Vec<u8>),
    /// Days since epoch.
    Date(i32),
    /// Milliseconds of day.
    Time(i32),
    /// Timestamp as epoch millis plus sub-millisecond nanos.
    Timestamp {
        /// Milliseconds since epoch.
        millis: i64,
        /// Nanoseconds within the millisecond (0..1_000_000).
        nanos_of_milli: i32,
    },
    /// Fixed-point decimal as `unscaled * 10^-scale`.
    Decimal {
        /// Unscaled integer value.
        unscaled: i128,
        /// Number of fractional digits.
        scale: u8,
    },
}

impl RowValue {
    /// Name of the value's type, for error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Boolean(_) => "BOOLEAN",
            Self::TinyInt(_) => "TINYINT",
            Self::SmallInt(_) => "SMALLINT",
            Self::Int(_) => "INT",
            Self::BigInt(_) => "BIGINT",
            Self::Float(_) => "FLOAT",
            Self::Double(_) => "DOUBLE",
            Self::String(_) => "VARCHAR",
            Self::Binary(_) => "BINARY",
            Self::Date(_) => "DATE",
            Self::Time(_) => "TIME",
            Self::Timestamp { .. } => "TIMESTAMP",
            Self::Decimal { .. } => "DECIMAL",
        }
    }
}

/// An engine row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RowData {
    values: Vec<RowValue>,
}

impl RowData {
    /// Creates a row from its values.
    #[must_use]
    pub fn new(values: Vec<RowValue>) -> Self {
        Self { values }
    }

    /// Number of columns.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.values.len()
    }

    /// Returns the value at a position.
    #[must_use]
    pub fn get(&self, pos: usize) -> Option<&RowValue> {
        self.values.get(pos)
    }
}

impl From<Vec<RowValue>> for RowData {
    fn from(values: Vec<RowValue>) -> Self {
        Self::new(values)
    }
}
