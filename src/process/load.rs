// src/process/load.rs

use anyhow::{Context, Result};
use arrow::{
    array::{new_null_array, ArrayRef},
    record_batch::RecordBatch,
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, error, warn};

use super::convert::convert_to_final_types;
use crate::error::PipelineError;
use crate::extract::{extract_table, RawTable};
use crate::schema::{
    build_arrow_schema, map_to_arrow_type, tables::ADVANCED_CANONICAL, AdvancedSchema, Column,
    TableSchema,
};

/// How the columns of a table are chosen.
#[derive(Debug, Clone, Copy)]
pub enum Layout {
    /// One positional schema, always.
    Fixed(&'static TableSchema),
    /// Advanced stats: pick V1/V2 from the pruned width, then project onto
    /// the canonical advanced column set.
    Advanced,
}

impl Layout {
    pub fn table_id(&self) -> &'static str {
        match self {
            Layout::Fixed(s) => s.table_id,
            Layout::Advanced => "advanced",
        }
    }

    pub fn output_columns(&self) -> &'static [Column] {
        match self {
            Layout::Fixed(s) => s.columns,
            Layout::Advanced => ADVANCED_CANONICAL,
        }
    }

    /// The typed-but-empty result handed back when nothing could be read.
    pub fn empty(&self) -> RecordBatch {
        RecordBatch::new_empty(build_arrow_schema(self.output_columns()))
    }
}

/// A document that existed but whose table could not be read.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub table_id: &'static str,
    pub reason: String,
}

/// What happened across every load of a run.
#[derive(Debug, Default, Clone)]
pub struct LoadReport {
    pub loaded: usize,
    pub missing: Vec<PathBuf>,
    pub failures: Vec<LoadFailure>,
    pub cast_failures: usize,
}

impl LoadReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// The failures as a caller-facing error, if there were any.
    pub fn failure_error(&self, year: i32) -> Option<PipelineError> {
        let first = self.failures.first()?;
        Some(PipelineError::SourceUnreadable {
            year,
            count: self.failures.len(),
            first: first.path.clone(),
        })
    }
}

/// Loads typed tables from saved pages. Every tolerated failure ends here:
/// callers always get a batch back, empty when nothing was readable, and the
/// reason is kept in the report.
#[derive(Debug, Default)]
pub struct TableLoader {
    report: LoadReport,
}

impl TableLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn into_report(self) -> LoadReport {
        self.report
    }

    /// Load `layout`'s table from the document at `path`.
    pub fn load(&mut self, path: &Path, layout: Layout) -> RecordBatch {
        if !path.is_file() {
            debug!(path = %path.display(), "source missing");
            self.report.missing.push(path.to_path_buf());
            return layout.empty();
        }
        match fs::read(path) {
            Ok(bytes) => self.load_str(&String::from_utf8_lossy(&bytes), path, layout),
            Err(e) => {
                self.fail(path, layout, format!("cannot open: {}", e));
                layout.empty()
            }
        }
    }

    /// Load from an in-memory document; `origin` is only used for reporting.
    pub fn load_str(&mut self, html: &str, origin: &Path, layout: Layout) -> RecordBatch {
        let Some(raw) = extract_table(html, layout.table_id()) else {
            self.fail(origin, layout, "table not found".into());
            return layout.empty();
        };
        match self.type_table(raw, origin, layout) {
            Ok(batch) => {
                self.report.loaded += 1;
                batch
            }
            Err(e) => {
                self.fail(origin, layout, format!("{:#}", e));
                layout.empty()
            }
        }
    }

    fn fail(&mut self, path: &Path, layout: Layout, reason: String) {
        error!(path = %path.display(), table = layout.table_id(), %reason, "parsing failed");
        self.report.failures.push(LoadFailure {
            path: path.to_path_buf(),
            table_id: layout.table_id(),
            reason,
        });
    }

    fn type_table(&mut self, raw: RawTable, origin: &Path, layout: Layout) -> Result<RecordBatch> {
        if raw.is_empty() {
            return Ok(layout.empty());
        }

        let (rows, schema) = match layout {
            Layout::Fixed(schema) => (raw.rows, schema),
            Layout::Advanced => {
                let rows = prune_empty_columns(raw.rows);
                let width = rows.first().map_or(0, Vec::len);
                let variant =
                    AdvancedSchema::detect(width).ok_or_else(|| PipelineError::UnknownAdvancedShape {
                        path: origin.to_path_buf(),
                        columns: width,
                    })?;
                debug!(path = %origin.display(), ?variant, "advanced layout");
                (rows, variant.schema())
            }
        };

        let width = rows.first().map_or(0, Vec::len);
        if width != schema.width() {
            warn!(
                path = %origin.display(),
                table = schema.table_id,
                found = width,
                expected = schema.width(),
                "column count mismatch; assigning names by position"
            );
        }

        let (batch, failed) = convert_to_final_types(&rows, schema.columns)
            .with_context(|| format!("typing `{}` from {}", schema.table_id, origin.display()))?;
        if failed > 0 {
            debug!(path = %origin.display(), table = schema.table_id, cells = failed, "cast failures coerced to missing");
            self.report.cast_failures += failed;
        }

        match layout {
            Layout::Fixed(_) => Ok(batch),
            Layout::Advanced => project(&batch, ADVANCED_CANONICAL),
        }
    }
}

/// Drop columns whose cells are all blank.
fn prune_empty_columns(rows: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let width = rows.first().map_or(0, Vec::len);
    let keep: Vec<usize> = (0..width)
        .filter(|&i| rows.iter().any(|r| r.get(i).is_some_and(|c| !c.trim().is_empty())))
        .collect();
    rows.into_iter()
        .map(|r| keep.iter().map(|&i| r.get(i).cloned().unwrap_or_default()).collect())
        .collect()
}

/// Reorder onto `columns`, adding all-null columns for names the batch lacks.
fn project(batch: &RecordBatch, columns: &[Column]) -> Result<RecordBatch> {
    let cols: Vec<ArrayRef> = columns
        .iter()
        .map(|c| match batch.column_by_name(c.name) {
            Some(a) => a.clone(),
            None => new_null_array(&map_to_arrow_type(c.ty), batch.num_rows()),
        })
        .collect();
    RecordBatch::try_new(build_arrow_schema(columns), cols).context("projecting advanced table")
}
