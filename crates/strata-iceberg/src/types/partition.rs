//! Partition specification types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::schema::IcebergPrimitiveType;
use crate::error::SinkResult;

/// Partition specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionSpec {
    /// Spec ID.
    #[serde(rename = "spec-id", default)]
    pub spec_id: i32,

    /// Partition fields.
    #[serde(default)]
    pub fields: Vec<PartitionField>,
}

impl PartitionSpec {
    /// Creates a spec with the given fields.
    #[must_use]
    pub fn new(spec_id: i32, fields: Vec<PartitionField>) -> Self {
        Self { spec_id, fields }
    }

    /// Creates an unpartitioned spec.
    #[must_use]
    pub fn unpartitioned() -> Self {
        Self::new(0, Vec::new())
    }

    /// Parses a spec from Iceberg JSON.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if `json` is not a partition spec.
    pub fn from_json(json: &str) -> SinkResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            strata_core::Error::serialization_with_source("failed to parse partition spec", e)
                .into()
        })
    }

    /// Returns true if the spec has no fields, or only `void` fields.
    #[must_use]
    pub fn is_unpartitioned(&self) -> bool {
        self.fields
            .iter()
            .all(|f| matches!(f.transform, Transform::Void))
    }
}

/// A field in a partition specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionField {
    /// Unique partition field ID.
    #[serde(rename = "field-id")]
    pub field_id: i32,

    /// Source column ID.
    #[serde(rename = "source-id")]
    pub source_id: i32,

    /// Field name.
    pub name: String,

    /// Transform applied to the source column.
    pub transform: Transform,
}

impl PartitionField {
    /// Creates a partition field.
    #[must_use]
    pub fn new(
        field_id: i32,
        source_id: i32,
        name: impl Into<String>,
        transform: Transform,
    ) -> Self {
        Self {
            field_id,
            source_id,
            name: name.into(),
            transform,
        }
    }
}

/// Partition transform.
///
/// Serialized as the Iceberg transform string. Unrecognized strings parse to
/// [`Transform::Unknown`] so that metadata written by newer writers still
/// loads; such fields are rejected when a partition key is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Transform {
    /// Source value, unmodified.
    Identity,
    /// Hash of the source value modulo N.
    Bucket(u32),
    /// Source value truncated to width W.
    Truncate(u32),
    /// Years since 1970.
    Year,
    /// Months since 1970-01.
    Month,
    /// Days since 1970-01-01.
    Day,
    /// Hours since 1970-01-01 00:00.
    Hour,
    /// Always null.
    Void,
    /// A transform this crate does not understand.
    Unknown(String),
}

impl Transform {
    /// Returns the declared bucket count for `bucket[N]`.
    #[must_use]
    pub fn bucket_count(&self) -> Option<u32> {
        match self {
            Self::Bucket(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns true if this transform accepts values of the given source type.
    #[must_use]
    pub fn can_transform(&self, source: &IcebergPrimitiveType) -> bool {
        use IcebergPrimitiveType as P;

        match self {
            Self::Identity | Self::Void => true,
            Self::Bucket(_) => matches!(
                source,
                P::Int
                    | P::Long
                    | P::Date
                    | P::Time
                    | P::Timestamp
                    | P::Timestamptz
                    | P::String
                    | P::Uuid
                    | P::Fixed(_)
                    | P::Binary
                    | P::Decimal { .. }
            ),
            Self::Truncate(_) => matches!(
                source,
                P::Int | P::Long | P::String | P::Binary | P::Decimal { .. }
            ),
            Self::Year | Self::Month | Self::Day => {
                matches!(source, P::Date | P::Timestamp | P::Timestamptz)
            }
            Self::Hour => matches!(source, P::Timestamp | P::Timestamptz),
            Self::Unknown(_) => false,
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("identity"),
            Self::Bucket(n) => write!(f, "bucket[{n}]"),
            Self::Truncate(w) => write!(f, "truncate[{w}]"),
            Self::Year => f.write_str("year"),
            Self::Month => f.write_str("month"),
            Self::Day => f.write_str("day"),
            Self::Hour => f.write_str("hour"),
            Self::Void => f.write_str("void"),
            Self::Unknown(s) => f.write_str(s),
        }
    }
}

impl FromStr for Transform {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let parsed = match lower.as_str() {
            "identity" => Self::Identity,
            "year" => Self::Year,
            "month" => Self::Month,
            "day" => Self::Day,
            "hour" => Self::Hour,
            "void" => Self::Void,
            other => parse_parameterized(other).unwrap_or_else(|| Self::Unknown(s.to_string())),
        };
        Ok(parsed)
    }
}

fn parse_parameterized(s: &str) -> Option<Transform> {
    let (name, rest) = s.split_once('[')?;
    let arg: u32 = rest.strip_suffix(']')?.trim().parse().ok()?;
    match name {
        "bucket" => Some(Transform::Bucket(arg)),
        "truncate" => Some(Transform::Truncate(arg)),
        _ => None,
    }
}

impl From<String> for Transform {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(t) => t,
            Err(never) => match never {},
        }
    }
}

impl From<Transform> for String {
    fn from(value: Transform) -> Self {
        value.to_string()
    }
}
