//! Iceberg-domain values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A value in Iceberg's internal representation.
///
/// Dates are days since epoch; times and timestamps are microseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Literal {
    /// Boolean.
    Boolean(bool),
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// Days since 1970-01-01.
    Date(i32),
    /// Microseconds of day.
    Time(i64),
    /// Microseconds since epoch.
    Timestamp(i64),
    /// UTF-8 string.
    String(String),
    /// Bytes (binary, fixed and uuid columns).
    Binary(Vec<u8>),
    /// Fixed-point decimal as `unscaled * 10^-scale`.
    Decimal {
        /// Unscaled integer value.
        unscaled: i128,
        /// Number of fractional digits.
        scale: u8,
    },
}

impl Literal {
    /// Name of the value's Iceberg type, for error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
            Self::Timestamp(_) => "timestamp",
            Self::String(_) => "string",
            Self::Binary(_) => "binary",
            Self::Decimal { .. } => "decimal",
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Int(v) | Self::Date(v) => write!(f, "{v}"),
            Self::Long(v) | Self::Time(v) | Self::Timestamp(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::Binary(bytes) => {
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
            Self::Decimal { unscaled, scale } => fmt_decimal(f, *unscaled, *scale),
        }
    }
}

fn fmt_decimal(f: &mut fmt::Formatter<'_>, unscaled: i128, scale: u8) -> fmt::Result {
    if scale == 0 {
        return write!(f, "{unscaled}");
    }
    let scale = usize::from(scale);
    let sign = if unscaled < 0 { "-" } else { "" };
    let digits = format!("{:0>width$}", unscaled.unsigned_abs(), width = scale + 1);
    let (whole, fraction) = digits.split_at(digits.len() - scale);
    write!(f, "{sign}{whole}.{fraction}")
}
