// src/process/convert.rs

use anyhow::{Context, Result};
use arrow::{
    array::{Array, ArrayRef, StringArray},
    compute::cast,
    record_batch::RecordBatch,
};
use std::sync::Arc;

use super::utils::clean_str;
use crate::schema::{build_arrow_schema, map_to_arrow_type, Column, ScalarType};

/// Build a typed batch from positional string rows.
///
/// Column `i` of `columns` takes cell `i` of every row; short rows read as
/// missing. Empty cells become nulls. A cell that does not parse as its
/// declared type also becomes null instead of failing the table.
///
/// Returns the batch and the number of cells that failed their cast.
pub fn convert_to_final_types(
    rows: &[Vec<String>],
    columns: &[Column],
) -> Result<(RecordBatch, usize)> {
    let mut out = Vec::with_capacity(columns.len());
    let mut failed = 0;

    for (i, col) in columns.iter().enumerate() {
        let text: StringArray = rows
            .iter()
            .map(|r| r.get(i).map(|s| clean_str(s)).filter(|s| !s.is_empty()))
            .collect();

        let arr: ArrayRef = match col.ty {
            ScalarType::Text => Arc::new(text),
            ty => {
                let typed = cast(&text, &map_to_arrow_type(ty))
                    .with_context(|| format!("casting column `{}`", col.name))?;
                failed += typed.null_count() - text.null_count();
                typed
            }
        };
        out.push(arr);
    }

    let batch = RecordBatch::try_new(build_arrow_schema(columns), out)
        .context("assembling typed batch")?;
    Ok((batch, failed))
}
