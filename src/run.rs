// src/run.rs
//
// One season end to end: saved pages in, Parquet tables out.

use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use crate::augment::{augment_all, load_draft, AugmentContext, FantasyRosters};
use crate::config::{Config, DataLayout};
use crate::fantasy::FantasyTeamAggregator;
use crate::process::frame::{constant_int, with_column};
use crate::process::{LoadReport, PlayerMerger, SeasonAggregator, TableLoader};
use crate::schema::tables::YEAR;
use crate::schema::TableKind;
use crate::store::write_table;

/// Build and persist the player table for `year`, then refresh the fantasy
/// team averages.
///
/// Unreadable documents do not stop the run; they are returned in the
/// report for the caller to act on. A season without any team documents
/// fails with `PipelineError::NoRawData`.
#[instrument(level = "info", skip(config, layout))]
pub fn process_season(config: &Config, layout: &DataLayout, year: i32) -> Result<LoadReport> {
    let teams = config.team_directory();
    let season = SeasonAggregator::new(layout, &teams, year);
    let mut loader = TableLoader::new();

    let roster = season.aggregate(&mut loader, TableKind::Roster)?;
    let per_game = season.aggregate(&mut loader, TableKind::PerGame)?;
    let salary = season.aggregate(&mut loader, TableKind::Salary)?;
    let advanced = season.aggregate(&mut loader, TableKind::Advanced)?;

    let merged = PlayerMerger::default().merge(&roster, &per_game, &salary, &advanced)?;
    let merged = with_column(&merged, YEAR, constant_int(year as i64, merged.num_rows()))?;

    let ctx = AugmentContext {
        draft: load_draft(layout, &mut loader)?,
        rosters: FantasyRosters::load(&layout.league_rosters(year))?,
        league: config.league.clone(),
        weights: config.weights.clone(),
    };
    let players = augment_all(merged, &ctx)
        .with_context(|| format!("augmenting season {}", year))?;
    write_table(&layout.player_table(year), &players)?;
    info!(players = players.num_rows(), columns = players.num_columns(), "season written");

    FantasyTeamAggregator.run(layout, year)?;

    let report = loader.into_report();
    if report.has_failures() {
        warn!(
            failures = report.failures.len(),
            missing = report.missing.len(),
            "season processed with unreadable documents"
        );
    }
    Ok(report)
}
