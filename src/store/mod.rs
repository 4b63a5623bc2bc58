// src/store/mod.rs
//
// Season tables on disk as single Parquet files.

use anyhow::{Context, Result};
use arrow::{compute::concat_batches, record_batch::RecordBatch};
use parquet::{
    arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter},
    basic::Compression,
    file::properties::WriterProperties,
};
use std::{
    fs::{self, File},
    path::Path,
};
use tracing::{debug, instrument};

/// Write `batch` to `path`, replacing any previous file. The data goes to a
/// `.tmp` sibling first and is renamed into place once closed.
#[instrument(level = "info", skip_all, fields(path = %path.display(), rows = batch.num_rows()))]
pub fn write_table(path: &Path, batch: &RecordBatch) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let tmp_path = path.with_extension("parquet.tmp");

    let tmp_file = File::create(&tmp_path)
        .with_context(|| format!("creating temporary Parquet file {}", tmp_path.display()))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(tmp_file, batch.schema(), Some(props))
        .context("initializing Parquet writer")?;
    writer.write(batch).context("writing batch to Parquet")?;
    writer.close().context("closing Parquet writer")?;

    let file_size = fs::metadata(&tmp_path)
        .context("getting file metadata")?
        .len();
    fs::rename(&tmp_path, path).context("renaming Parquet file")?;
    debug!(bytes = file_size, "table written");
    Ok(())
}

/// Read a whole Parquet file back as one batch, schema metadata included.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn read_table(path: &Path) -> Result<RecordBatch> {
    let file =
        File::open(path).with_context(|| format!("failed to open `{}`", path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("reading Parquet footer of `{}`", path.display()))?;
    let schema = builder.schema().clone();
    let reader = builder.with_batch_size(8192).build()?;

    let batches = reader
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("decoding `{}`", path.display()))?;
    concat_batches(&schema, &batches).context("concatenating Parquet batches")
}
