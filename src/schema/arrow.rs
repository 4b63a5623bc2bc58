// src/schema/arrow.rs

use arrow::datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema};
use std::sync::Arc;

use super::types::{Column, ScalarType};

/// Map a declared scalar type onto its Arrow storage type.
///
/// - Integer → Int64
/// - Float   → Float64
/// - Text    → Utf8
pub fn map_to_arrow_type(ty: ScalarType) -> DataType {
    match ty {
        ScalarType::Integer => DataType::Int64,
        ScalarType::Float => DataType::Float64,
        ScalarType::Text => DataType::Utf8,
    }
}

/// Build an ArrowSchema (inside an Arc) from a slice of `Column`s.
/// Every field is nullable: a failed cast leaves a null behind.
pub fn build_arrow_schema(cols: &[Column]) -> Arc<ArrowSchema> {
    let fields: Vec<ArrowField> = cols
        .iter()
        .map(|col| ArrowField::new(col.name, map_to_arrow_type(col.ty), true))
        .collect();

    Arc::new(ArrowSchema::new(fields))
}
