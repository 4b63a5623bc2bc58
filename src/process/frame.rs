// src/process/frame.rs
//
// Small column-level helpers over Arrow record batches. Schema metadata is
// carried through every rebuild.

use anyhow::{Context, Result};
use arrow::{
    array::{Array, ArrayRef, AsArray, Int64Array, StringArray, UInt32Array},
    compute::{cast, take},
    datatypes::{DataType, Field, Float64Type, Schema},
    record_batch::RecordBatch,
};
use std::sync::Arc;

use crate::error::PipelineError;

fn rebuild(batch: &RecordBatch, fields: Vec<Field>, cols: Vec<ArrayRef>) -> Result<RecordBatch> {
    let schema = Schema::new_with_metadata(fields, batch.schema().metadata().clone());
    RecordBatch::try_new(Arc::new(schema), cols).context("rebuilding record batch")
}

/// Replace the column called `name`, or append it if absent.
pub fn with_column(batch: &RecordBatch, name: &str, array: ArrayRef) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
    let mut cols: Vec<ArrayRef> = batch.columns().to_vec();
    let field = Field::new(name, array.data_type().clone(), true);

    match schema.index_of(name) {
        Ok(i) => {
            fields[i] = field;
            cols[i] = array;
        }
        Err(_) => {
            fields.push(field);
            cols.push(array);
        }
    }
    rebuild(batch, fields, cols)
}

/// Remove every listed column that exists; unknown names are ignored.
pub fn drop_columns(batch: &RecordBatch, names: &[&str]) -> Result<RecordBatch> {
    let schema = batch.schema();
    let (fields, cols): (Vec<Field>, Vec<ArrayRef>) = schema
        .fields()
        .iter()
        .zip(batch.columns())
        .filter(|(f, _)| !names.contains(&f.name().as_str()))
        .map(|(f, c)| (f.as_ref().clone(), c.clone()))
        .unzip();
    rebuild(batch, fields, cols)
}

/// Gather rows by index. Null indices produce all-null rows.
pub fn take_rows(batch: &RecordBatch, indices: &UInt32Array) -> Result<RecordBatch> {
    let cols = batch
        .columns()
        .iter()
        .map(|c| take(c.as_ref(), indices, None))
        .collect::<Result<Vec<_>, _>>()
        .context("gathering rows")?;
    let fields = batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.as_ref().clone().with_nullable(true))
        .collect();
    rebuild(batch, fields, cols)
}

/// Text column by name, if present and stored as Utf8.
pub fn text_column<'a>(batch: &'a RecordBatch, name: &str) -> Option<&'a StringArray> {
    batch.column_by_name(name)?.as_string_opt::<i32>()
}

/// Text column that must exist.
pub fn require_text<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    text_column(batch, name).ok_or_else(|| PipelineError::MissingColumn(name.to_string()).into())
}

/// Numeric column as `f64`, nulls kept. `None` if the column is absent.
pub fn opt_f64_values(batch: &RecordBatch, name: &str) -> Result<Option<Vec<Option<f64>>>> {
    let Some(col) = batch.column_by_name(name) else {
        return Ok(None);
    };
    let as_f64 = cast(col.as_ref(), &DataType::Float64)
        .with_context(|| format!("casting `{}` to Float64", name))?;
    Ok(Some(as_f64.as_primitive::<Float64Type>().iter().collect()))
}

/// Numeric column as `f64` with absent columns and missing cells read as 0.
pub fn f64_values(batch: &RecordBatch, name: &str) -> Result<Vec<f64>> {
    Ok(match opt_f64_values(batch, name)? {
        Some(vals) => vals.into_iter().map(|v| v.unwrap_or(0.0)).collect(),
        None => vec![0.0; batch.num_rows()],
    })
}

/// The same integer in every row.
pub fn constant_int(value: i64, rows: usize) -> ArrayRef {
    Arc::new(Int64Array::from(vec![value; rows]))
}

/// The same string in every row.
pub fn constant_text(value: &str, rows: usize) -> ArrayRef {
    Arc::new(StringArray::from(vec![value; rows]))
}

/// Replace nulls with zero in the listed numeric columns.
pub fn fill_zero(batch: &RecordBatch, names: &[&str]) -> Result<RecordBatch> {
    let mut out = batch.clone();
    for &name in names {
        let Some(col) = out.column_by_name(name).cloned() else {
            continue;
        };
        if col.null_count() == 0 {
            continue;
        }
        let filled: ArrayRef = match col.data_type() {
            DataType::Int64 => Arc::new(
                col.as_primitive::<arrow::datatypes::Int64Type>()
                    .iter()
                    .map(|v| Some(v.unwrap_or(0)))
                    .collect::<Int64Array>(),
            ),
            DataType::Float64 => Arc::new(
                col.as_primitive::<Float64Type>()
                    .iter()
                    .map(|v| Some(v.unwrap_or(0.0)))
                    .collect::<arrow::array::Float64Array>(),
            ),
            _ => continue,
        };
        out = with_column(&out, name, filled)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Float64Array;

    fn sample() -> RecordBatch {
        let schema = Schema::new(vec![
            Field::new("Player", DataType::Utf8, true),
            Field::new("G", DataType::Int64, true),
            Field::new("PTS", DataType::Float64, true),
        ]);
        RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(StringArray::from(vec![Some("A"), Some("B")])),
                Arc::new(Int64Array::from(vec![Some(10), None])),
                Arc::new(Float64Array::from(vec![Some(12.5), Some(3.0)])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn numeric_reads_default_to_zero() {
        let b = sample();
        assert_eq!(f64_values(&b, "G").unwrap(), vec![10.0, 0.0]);
        assert_eq!(f64_values(&b, "PTS").unwrap(), vec![12.5, 3.0]);
        assert_eq!(f64_values(&b, "AST").unwrap(), vec![0.0, 0.0]);
        assert!(opt_f64_values(&b, "AST").unwrap().is_none());
    }

    #[test]
    fn replace_append_and_drop() {
        let b = sample();
        let b = with_column(&b, "PTS", Arc::new(Float64Array::from(vec![1.0, 2.0]))).unwrap();
        let b = with_column(&b, "year", constant_int(2015, 2)).unwrap();
        assert_eq!(b.num_columns(), 4);
        assert_eq!(f64_values(&b, "PTS").unwrap(), vec![1.0, 2.0]);
        let b = drop_columns(&b, &["G", "nope"]).unwrap();
        let names: Vec<_> = b.schema().fields().iter().map(|f| f.name().clone()).collect();
        assert_eq!(names, vec!["Player", "PTS", "year"]);
    }

    #[test]
    fn take_with_null_index_yields_null_row() {
        let b = sample();
        let idx = UInt32Array::from(vec![Some(1), None]);
        let out = take_rows(&b, &idx).unwrap();
        let players = require_text(&out, "Player").unwrap();
        assert_eq!(players.value(0), "B");
        assert!(players.is_null(1));
    }

    #[test]
    fn fill_zero_replaces_nulls() {
        let b = fill_zero(&sample(), &["G"]).unwrap();
        assert_eq!(b.column_by_name("G").unwrap().null_count(), 0);
    }
}
