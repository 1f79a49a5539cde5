//! Table metadata and record types used by sink routing.

pub mod literal;
pub mod partition;
pub mod row;
pub mod schema;

pub use literal::Literal;
pub use partition::{PartitionField, PartitionSpec, Transform};
pub use row::{LogicalType, RowData, RowField, RowType, RowValue};
pub use schema::{
    IcebergComplexType, IcebergField, IcebergPrimitiveType, IcebergSchema, IcebergType,
};
