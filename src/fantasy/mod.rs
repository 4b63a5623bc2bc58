// src/fantasy/mod.rs
//
// Per-fantasy-team averages of the augmented player table.

use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Float64Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::{collections::BTreeMap, sync::Arc};
use tracing::{info, instrument};

use crate::augment::{FANTASY_TEAM, FREE_AGENT};
use crate::config::DataLayout;
use crate::process::frame::{opt_f64_values, require_text, text_column};
use crate::process::utils::round_to;
use crate::store::{read_table, write_table};

/// Decimal places kept per averaged column. Columns not listed are left
/// unrounded.
pub const ROUNDING: &[(&str, u32)] = &[
    ("Age", 2),
    ("G", 2),
    ("GS", 2),
    ("MP", 2),
    ("3P", 2),
    ("TRB", 2),
    ("AST", 2),
    ("STL", 2),
    ("BLK", 2),
    ("PTS", 2),
    ("FG%", 3),
    ("FT%", 3),
    ("Salary", 3),
    ("PER", 3),
    ("WS", 3),
    ("value", 3),
    ("price", 3),
];

fn places(column: &str) -> Option<u32> {
    ROUNDING.iter().find(|(c, _)| *c == column).map(|(_, p)| *p)
}

fn is_numeric(ty: &DataType) -> bool {
    matches!(ty, DataType::Int64 | DataType::Float64)
}

/// Mean of the non-missing values, `None` if there are none.
fn mean(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, n) = values
        .flatten()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Averages every numeric column per fantasy team.
#[derive(Debug, Default, Clone, Copy)]
pub struct FantasyTeamAggregator;

impl FantasyTeamAggregator {
    /// One row per owning team, sorted by label, with the label as the
    /// first column. Free agents and rows without a label are left out.
    /// Averages skip missing values and are rounded per [`ROUNDING`].
    #[instrument(level = "info", skip_all, fields(rows = players.num_rows()))]
    pub fn aggregate(&self, players: &RecordBatch) -> Result<RecordBatch> {
        let labels = require_text(players, FANTASY_TEAM)?;

        let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (i, label) in labels.iter().enumerate() {
            match label {
                Some(l) if l != FREE_AGENT => groups.entry(l).or_default().push(i),
                _ => {}
            }
        }

        let mut fields = vec![Field::new(FANTASY_TEAM, DataType::Utf8, false)];
        let mut cols: Vec<ArrayRef> = vec![Arc::new(StringArray::from(
            groups.keys().copied().collect::<Vec<_>>(),
        ))];

        let schema = players.schema();
        for field in schema.fields().iter().filter(|f| is_numeric(f.data_type())) {
            let name = field.name();
            let values = opt_f64_values(players, name)?
                .with_context(|| format!("column `{}` vanished", name))?;
            let digits = places(name);
            let averaged: Float64Array = groups
                .values()
                .map(|rows| {
                    let m = mean(rows.iter().map(|&i| values[i]))?;
                    Some(digits.map_or(m, |d| round_to(m, d)))
                })
                .collect();
            fields.push(Field::new(name, DataType::Float64, true));
            cols.push(Arc::new(averaged));
        }

        info!(teams = groups.len(), "fantasy teams averaged");
        RecordBatch::try_new(Arc::new(Schema::new(fields)), cols)
            .context("assembling fantasy team averages")
    }

    /// Recompute `fantasy_team_data.parquet` for `year` from the saved
    /// player table.
    ///
    /// Skipped (returning `None`) until the player table exists and at least
    /// one player has a fantasy owner.
    #[instrument(level = "info", skip(self, layout))]
    pub fn run(&self, layout: &DataLayout, year: i32) -> Result<Option<RecordBatch>> {
        let source = layout.player_table(year);
        if !source.is_file() {
            info!(path = %source.display(), "no player table yet; skipping fantasy averages");
            return Ok(None);
        }
        let players = read_table(&source)?;
        let owned = text_column(&players, FANTASY_TEAM)
            .is_some_and(|c| c.iter().flatten().any(|l| l != FREE_AGENT));
        if !owned {
            info!("no fantasy assignments yet; skipping fantasy averages");
            return Ok(None);
        }

        let teams = self.aggregate(&players)?;
        write_table(&layout.fantasy_team_table(year), &teams)?;
        Ok(Some(teams))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{AsArray, Int64Array};
    use arrow::datatypes::Float64Type;
    use tempfile::tempdir;

    fn season() -> RecordBatch {
        let schema = Schema::new(vec![
            Field::new("Player", DataType::Utf8, true),
            Field::new(FANTASY_TEAM, DataType::Utf8, true),
            Field::new("G", DataType::Int64, true),
            Field::new("PTS", DataType::Float64, true),
            Field::new("FG%", DataType::Float64, true),
        ]);
        RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(StringArray::from(vec!["A", "B", "C", "D", "E"])),
                Arc::new(StringArray::from(vec!["Zed", "Alpha", "Zed", FREE_AGENT, "Zed"])),
                Arc::new(Int64Array::from(vec![Some(80), Some(70), Some(60), Some(10), None])),
                Arc::new(Float64Array::from(vec![10.0, 20.0, 11.0, 99.0, 12.0])),
                Arc::new(Float64Array::from(vec![0.4, 0.5, 0.45, 0.9, 0.5])),
            ],
        )
        .unwrap()
    }

    fn column(b: &RecordBatch, name: &str) -> Vec<Option<f64>> {
        b.column_by_name(name)
            .unwrap()
            .as_primitive::<Float64Type>()
            .iter()
            .collect()
    }

    #[test]
    fn averages_per_team_without_free_agents() {
        let out = FantasyTeamAggregator.aggregate(&season()).unwrap();
        assert_eq!(out.num_rows(), 2);
        assert_eq!(out.schema().field(0).name(), FANTASY_TEAM);
        let labels = out.column(0).as_string::<i32>();
        assert_eq!((labels.value(0), labels.value(1)), ("Alpha", "Zed"));

        // the missing G for E is skipped, not counted as zero
        assert_eq!(column(&out, "G"), vec![Some(70.0), Some(70.0)]);
        assert_eq!(column(&out, "PTS"), vec![Some(20.0), Some(11.0)]);
        // 1.35 / 3 rounded to three places
        assert_eq!(column(&out, "FG%"), vec![Some(0.5), Some(0.45)]);
        assert!(out.column_by_name("Player").is_none());
    }

    #[test]
    fn rounding_table() {
        assert_eq!(places("PTS"), Some(2));
        assert_eq!(places("value"), Some(3));
        assert_eq!(places("TOV"), None);
        assert_eq!(mean([Some(1.0), None, Some(2.0)].into_iter()), Some(1.5));
        assert_eq!(mean([None].into_iter()), None);
    }

    #[test]
    fn run_is_guarded() {
        let tmp = tempdir().unwrap();
        let layout = DataLayout::new(tmp.path());
        let agg = FantasyTeamAggregator;
        assert!(agg.run(&layout, 2015).unwrap().is_none());

        let schema = Schema::new(vec![
            Field::new("Player", DataType::Utf8, true),
            Field::new(FANTASY_TEAM, DataType::Utf8, true),
        ]);
        let nobody = RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(StringArray::from(vec!["A"])),
                Arc::new(StringArray::from(vec![FREE_AGENT])),
            ],
        )
        .unwrap();
        write_table(&layout.player_table(2015), &nobody).unwrap();
        assert!(agg.run(&layout, 2015).unwrap().is_none());
        assert!(!layout.fantasy_team_table(2015).exists());

        write_table(&layout.player_table(2015), &season()).unwrap();
        let out = agg.run(&layout, 2015).unwrap().unwrap();
        assert_eq!(out.num_rows(), 2);
        assert_eq!(read_table(&layout.fantasy_team_table(2015)).unwrap().num_rows(), 2);
    }
}
