// src/augment/minutes.rs

use anyhow::Result;
use arrow::{array::Float64Array, record_batch::RecordBatch};
use std::sync::Arc;
use tracing::instrument;

use super::{check_ready, mark, Stage};
use crate::process::frame::{f64_values, opt_f64_values, with_column};

/// Season-total minutes, preserved once `MP` becomes per-game.
pub const MINUTES_TOTAL: &str = "MP_total";
pub const MINUTES: &str = "MP";

/// Turn the advanced table's season-total `MP` into minutes per game.
///
/// The total is kept as `MP_total`; a repeat run reads from it, so
/// applying the stage twice gives the same result. Missing or zero games
/// played give 0.
#[instrument(level = "debug", skip_all)]
pub fn augment_minutes(batch: RecordBatch) -> Result<RecordBatch> {
    check_ready(&batch, Stage::Minutes)?;

    let total = match opt_f64_values(&batch, MINUTES_TOTAL)? {
        Some(t) => t.into_iter().map(|v| v.unwrap_or(0.0)).collect(),
        None => f64_values(&batch, MINUTES)?,
    };
    let games = f64_values(&batch, "G")?;

    let per_game: Float64Array = total
        .iter()
        .zip(&games)
        .map(|(&mp, &g)| Some(if g > 0.0 { mp / g } else { 0.0 }))
        .collect();

    let out = with_column(&batch, MINUTES_TOTAL, Arc::new(Float64Array::from(total)))?;
    let out = with_column(&out, MINUTES, Arc::new(per_game))?;
    mark(out, Stage::Minutes)
}
