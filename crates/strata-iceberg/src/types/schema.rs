//! Iceberg table schema types.
//!
//! Only top-level primitive columns can be partition sources; complex
//! columns are parsed so that full table schemas load, but they are never
//! wrapped or transformed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SinkResult;

/// Iceberg primitive types.
///
/// Serialized as the Iceberg type string (`int`, `fixed[16]`, `decimal(10,2)`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum IcebergPrimitiveType {
    /// Boolean type.
    Boolean,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 32-bit IEEE 754 floating point.
    Float,
    /// 64-bit IEEE 754 floating point.
    Double,
    /// Calendar date without time.
    Date,
    /// Time of day without date.
    Time,
    /// Timestamp without timezone.
    Timestamp,
    /// Timestamp with timezone.
    Timestamptz,
    /// Arbitrary-length character sequences.
    String,
    /// Universally unique identifier.
    Uuid,
    /// Fixed-length byte array.
    Fixed(usize),
    /// Arbitrary-length byte array.
    Binary,
    /// Arbitrary-precision decimal.
    Decimal {
        /// Total number of digits.
        precision: u8,
        /// Number of fractional digits.
        scale: u8,
    },
}

impl fmt::Display for IcebergPrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => f.write_str("boolean"),
            Self::Int => f.write_str("int"),
            Self::Long => f.write_str("long"),
            Self::Float => f.write_str("float"),
            Self::Double => f.write_str("double"),
            Self::Date => f.write_str("date"),
            Self::Time => f.write_str("time"),
            Self::Timestamp => f.write_str("timestamp"),
            Self::Timestamptz => f.write_str("timestamptz"),
            Self::String => f.write_str("string"),
            Self::Uuid => f.write_str("uuid"),
            Self::Fixed(n) => write!(f, "fixed[{n}]"),
            Self::Binary => f.write_str("binary"),
            Self::Decimal { precision, scale } => write!(f, "decimal({precision},{scale})"),
        }
    }
}

impl FromStr for IcebergPrimitiveType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = match s {
            "boolean" => Self::Boolean,
            "int" => Self::Int,
            "long" => Self::Long,
            "float" => Self::Float,
            "double" => Self::Double,
            "date" => Self::Date,
            "time" => Self::Time,
            "timestamp" => Self::Timestamp,
            "timestamptz" => Self::Timestamptz,
            "string" => Self::String,
            "uuid" => Self::Uuid,
            "binary" => Self::Binary,
            _ => {
                if let Some(len) = s.strip_prefix("fixed[").and_then(|r| r.strip_suffix(']')) {
                    let len = len
                        .trim()
                        .parse()
                        .map_err(|_| format!("invalid fixed length: {s}"))?;
                    Self::Fixed(len)
                } else if let Some(args) =
                    s.strip_prefix("decimal(").and_then(|r| r.strip_suffix(')'))
                {
                    let (precision, scale) = args
                        .split_once(',')
                        .ok_or_else(|| format!("invalid decimal type: {s}"))?;
                    Self::Decimal {
                        precision: precision
                            .trim()
                            .parse()
                            .map_err(|_| format!("invalid decimal precision: {s}"))?,
                        scale: scale
                            .trim()
                            .parse()
                            .map_err(|_| format!("invalid decimal scale: {s}"))?,
                    }
                } else {
                    return Err(format!("unknown primitive type: {s}"));
                }
            }
        };
        Ok(parsed)
    }
}

impl TryFrom<String> for IcebergPrimitiveType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IcebergPrimitiveType> for String {
    fn from(value: IcebergPrimitiveType) -> Self {
        value.to_string()
    }
}

/// Iceberg complex types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum IcebergComplexType {
    /// Nested structure with named fields.
    Struct {
        /// The nested fields.
        fields: Vec<IcebergField>,
    },
    /// Ordered collection of elements.
    List {
        /// Field ID for element.
        #[serde(rename = "element-id")]
        element_id: i32,
        /// Element type.
        element: Box<IcebergType>,
        /// Whether elements are required.
        #[serde(rename = "element-required")]
        element_required: bool,
    },
    /// Key-value collection.
    Map {
        /// Field ID for key.
        #[serde(rename = "key-id")]
        key_id: i32,
        /// Key type.
        key: Box<IcebergType>,
        /// Field ID for value.
        #[serde(rename = "value-id")]
        value_id: i32,
        /// Value type.
        value: Box<IcebergType>,
        /// Whether values are required.
        #[serde(rename = "value-required")]
        value_required: bool,
    },
}

/// An Iceberg type (primitive or complex).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IcebergType {
    /// A primitive type.
    Primitive(IcebergPrimitiveType),
    /// A complex type.
    Complex(IcebergComplexType),
}

impl IcebergType {
    /// Returns the primitive type, if this is one.
    #[must_use]
    pub fn as_primitive(&self) -> Option<&IcebergPrimitiveType> {
        match self {
            Self::Primitive(p) => Some(p),
            Self::Complex(_) => None,
        }
    }
}

impl fmt::Display for IcebergType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => p.fmt(f),
            Self::Complex(IcebergComplexType::Struct { .. }) => f.write_str("struct"),
            Self::Complex(IcebergComplexType::List { .. }) => f.write_str("list"),
            Self::Complex(IcebergComplexType::Map { .. }) => f.write_str("map"),
        }
    }
}

/// An Iceberg schema field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IcebergField {
    /// Unique field ID within the schema.
    pub id: i32,
    /// Field name.
    pub name: String,
    /// Whether the field is required.
    pub required: bool,
    /// Field type.
    #[serde(rename = "type")]
    pub field_type: IcebergType,
    /// Optional documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl IcebergField {
    /// Creates an optional primitive field.
    #[must_use]
    pub fn optional(id: i32, name: impl Into<String>, field_type: IcebergPrimitiveType) -> Self {
        Self {
            id,
            name: name.into(),
            required: false,
            field_type: IcebergType::Primitive(field_type),
            doc: None,
        }
    }

    /// Creates a required primitive field.
    #[must_use]
    pub fn required(id: i32, name: impl Into<String>, field_type: IcebergPrimitiveType) -> Self {
        Self {
            required: true,
            ..Self::optional(id, name, field_type)
        }
    }
}

/// An Iceberg table schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IcebergSchema {
    /// Schema ID for evolution tracking.
    #[serde(rename = "schema-id", default)]
    pub schema_id: i32,
    /// Top-level fields.
    pub fields: Vec<IcebergField>,
    /// Optional identifier fields (primary key).
    #[serde(
        rename = "identifier-field-ids",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub identifier_field_ids: Vec<i32>,
}

impl IcebergSchema {
    /// Creates a schema with the given top-level fields.
    #[must_use]
    pub fn new(fields: Vec<IcebergField>) -> Self {
        Self {
            schema_id: 0,
            fields,
            identifier_field_ids: Vec::new(),
        }
    }

    /// Parses a schema from Iceberg JSON.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if `json` is not a schema.
    pub fn from_json(json: &str) -> SinkResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            strata_core::Error::serialization_with_source("failed to parse schema", e).into()
        })
    }

    /// Returns the position of a top-level field by id.
    #[must_use]
    pub fn field_position(&self, field_id: i32) -> Option<usize> {
        self.fields.iter().position(|f| f.id == field_id)
    }

    /// Returns a top-level field by id.
    #[must_use]
    pub fn field_by_id(&self, field_id: i32) -> Option<&IcebergField> {
        self.fields.iter().find(|f| f.id == field_id)
    }
}
