// src/augment/value.rs
//
// Per-row fantasy value from weighted per-game categories.

use anyhow::Result;
use arrow::{array::Float64Array, record_batch::RecordBatch};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::minutes::MINUTES;
use super::{check_ready, mark, Stage};
use crate::config::{CategoryWeights, LeagueSettings};
use crate::process::frame::{f64_values, with_column};

pub const VALUE: &str = "value";

/// Per-game stats of one player, as read from the season table.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatLine {
    pub minutes: f64,
    pub fga: f64,
    pub fg_pct: f64,
    pub fta: f64,
    pub ft_pct: f64,
    pub threes: f64,
    pub rebounds: f64,
    pub assists: f64,
    pub steals: f64,
    pub blocks: f64,
    pub points: f64,
    pub turnovers: f64,
}

/// Volume-weighted shooting impact: attempts × (player% − reference%).
pub fn shooting_impact(attempts: f64, pct: f64, reference: f64) -> f64 {
    attempts * (pct - reference)
}

/// Value of one stat line. Depends on nothing but the line itself and the
/// league settings: below `min_minutes` per game a player is worth 0,
/// otherwise the weighted sum of the categories with turnovers counting
/// against and FG%/FT% measured against the league reference percentages.
pub fn player_value(line: &StatLine, league: &LeagueSettings, weights: &CategoryWeights) -> f64 {
    if line.minutes < league.min_minutes {
        return 0.0;
    }
    weights.fg_pct * shooting_impact(line.fga, line.fg_pct, league.reference_fg_pct)
        + weights.ft_pct * shooting_impact(line.fta, line.ft_pct, league.reference_ft_pct)
        + weights.threes * line.threes
        + weights.rebounds * line.rebounds
        + weights.assists * line.assists
        + weights.steals * line.steals
        + weights.blocks * line.blocks
        + weights.points * line.points
        - weights.turnovers * line.turnovers
}

/// Add the `value` column, one [`player_value`] per row. Missing stats
/// read as 0. Requires per-game minutes.
#[instrument(level = "info", skip_all, fields(rows = batch.num_rows()))]
pub fn augment_value(
    batch: RecordBatch,
    league: &LeagueSettings,
    weights: &CategoryWeights,
) -> Result<RecordBatch> {
    check_ready(&batch, Stage::Value)?;

    let minutes = f64_values(&batch, MINUTES)?;
    let fga = f64_values(&batch, "FGA")?;
    let fg_pct = f64_values(&batch, "FG%")?;
    let fta = f64_values(&batch, "FTA")?;
    let ft_pct = f64_values(&batch, "FT%")?;
    let threes = f64_values(&batch, "3P")?;
    let rebounds = f64_values(&batch, "TRB")?;
    let assists = f64_values(&batch, "AST")?;
    let steals = f64_values(&batch, "STL")?;
    let blocks = f64_values(&batch, "BLK")?;
    let points = f64_values(&batch, "PTS")?;
    let turnovers = f64_values(&batch, "TOV")?;

    let value: Float64Array = (0..batch.num_rows())
        .map(|i| {
            let line = StatLine {
                minutes: minutes[i],
                fga: fga[i],
                fg_pct: fg_pct[i],
                fta: fta[i],
                ft_pct: ft_pct[i],
                threes: threes[i],
                rebounds: rebounds[i],
                assists: assists[i],
                steals: steals[i],
                blocks: blocks[i],
                points: points[i],
                turnovers: turnovers[i],
            };
            Some(player_value(&line, league, weights))
        })
        .collect();
    debug!(
        qualified = minutes.iter().filter(|&&mp| mp >= league.min_minutes).count(),
        "players valued"
    );

    let out = with_column(&batch, VALUE, Arc::new(value))?;
    mark(out, Stage::Value)
}
