// src/augment/mod.rs
//
// Derived columns over the merged season table. Each stage keeps every row
// and records itself in the schema metadata, so a stage run out of order is
// caught even after the table has been through Parquet.

pub mod draft;
pub mod fantasy;
pub mod minutes;
pub mod price;
pub mod value;

use anyhow::{Context, Result};
use arrow::{datatypes::Schema, record_batch::RecordBatch};
use std::sync::Arc;
use tracing::instrument;

use crate::config::{CategoryWeights, LeagueSettings};
use crate::error::PipelineError;

pub use draft::{augment_draft_data, load_draft};
pub use fantasy::{augment_fantasy_teams, FantasyRosters, FANTASY_TEAM, FREE_AGENT};
pub use minutes::augment_minutes;
pub use price::augment_price;
pub use value::augment_value;

/// Schema metadata key listing applied stages, comma separated.
pub const STAGES_KEY: &str = "augmentations";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Draft,
    FantasyTeams,
    Minutes,
    Value,
    Price,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Draft => "draft",
            Stage::FantasyTeams => "fantasy_teams",
            Stage::Minutes => "minutes",
            Stage::Value => "value",
            Stage::Price => "price",
        }
    }

    /// Stages that must already be applied.
    pub fn requires(&self) -> &'static [Stage] {
        match self {
            Stage::Value => &[Stage::Minutes],
            Stage::Price => &[Stage::Value],
            _ => &[],
        }
    }
}

/// Stage names recorded on `batch`, in application order.
pub fn applied(batch: &RecordBatch) -> Vec<String> {
    batch
        .schema()
        .metadata()
        .get(STAGES_KEY)
        .map(|s| s.split(',').filter(|s| !s.is_empty()).map(str::to_string).collect())
        .unwrap_or_default()
}

/// Fail with `StageOrder` unless every prerequisite of `stage` is applied.
pub fn check_ready(batch: &RecordBatch, stage: Stage) -> Result<()> {
    let done = applied(batch);
    for req in stage.requires() {
        if !done.iter().any(|d| d == req.as_str()) {
            return Err(PipelineError::StageOrder {
                stage: stage.as_str(),
                missing: req.as_str(),
            }
            .into());
        }
    }
    Ok(())
}

/// Record `stage` as applied.
pub fn mark(batch: RecordBatch, stage: Stage) -> Result<RecordBatch> {
    let mut done = applied(&batch);
    if !done.iter().any(|d| d == stage.as_str()) {
        done.push(stage.as_str().to_string());
    }
    let schema = batch.schema();
    let mut metadata = schema.metadata().clone();
    metadata.insert(STAGES_KEY.to_string(), done.join(","));
    let schema = Schema::new_with_metadata(schema.fields().clone(), metadata);
    RecordBatch::try_new(Arc::new(schema), batch.columns().to_vec())
        .with_context(|| format!("marking stage `{}`", stage.as_str()))
}

/// Inputs the stages need beyond the table itself.
#[derive(Debug, Clone, Default)]
pub struct AugmentContext {
    /// Stacked draft history, if any draft documents exist.
    pub draft: Option<RecordBatch>,
    pub rosters: FantasyRosters,
    pub league: LeagueSettings,
    pub weights: CategoryWeights,
}

/// Apply every stage in dependency order: draft (when available), fantasy
/// teams, minutes, value, price.
#[instrument(level = "info", skip_all, fields(rows = batch.num_rows()))]
pub fn augment_all(batch: RecordBatch, ctx: &AugmentContext) -> Result<RecordBatch> {
    let mut out = batch;
    if let Some(draft) = &ctx.draft {
        out = augment_draft_data(out, draft)?;
    }
    out = augment_fantasy_teams(out, &ctx.rosters)?;
    out = augment_minutes(out)?;
    out = augment_value(out, &ctx.league, &ctx.weights)?;
    augment_price(out, &ctx.league)
}


#[cfg(test)]
mod tests {
    use super::test_support::players;
    use super::*;

    #[test]
    fn marks_accumulate_in_order() {
        let b = players(&["A"], &[("MP", &[30.0]), ("G", &[1.0])]);
        assert!(applied(&b).is_empty());
        let b = mark(b, Stage::Minutes).unwrap();
        let b = mark(b, Stage::Value).unwrap();
        let b = mark(b, Stage::Minutes).unwrap();
        assert_eq!(applied(&b), vec!["minutes", "value"]);
    }

    #[test]
    fn value_before_minutes_is_rejected() {
        let b = players(&["A"], &[("MP", &[300.0]), ("G", &[10.0]), ("PTS", &[20.0])]);
        let err = augment_value(b, &LeagueSettings::default(), &CategoryWeights::default())
            .unwrap_err();
        match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::StageOrder { stage, missing }) => {
                assert_eq!((*stage, *missing), ("value", "minutes"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn price_before_value_is_rejected() {
        let b = players(&["A"], &[("MP", &[300.0]), ("G", &[10.0])]);
        let b = augment_minutes(b).unwrap();
        let err = augment_price(b, &LeagueSettings::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::StageOrder { stage: "price", .. })
        ));
    }

    #[test]
    fn full_chain_keeps_every_row() {
        let b = players(
            &["A", "B", "C"],
            &[
                ("MP", &[2400.0, 1200.0, 0.0]),
                ("G", &[80.0, 60.0, 0.0]),
                ("PTS", &[25.0, 10.0, 0.0]),
            ],
        );
        let out = augment_all(b, &AugmentContext::default()).unwrap();
        assert_eq!(out.num_rows(), 3);
        assert_eq!(applied(&out), vec!["fantasy_teams", "minutes", "value", "price"]);
        for col in [FANTASY_TEAM, "MP", "MP_total", "value", "price"] {
            assert!(out.column_by_name(col).is_some(), "{}", col);
        }
    }
}
