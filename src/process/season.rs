// src/process/season.rs
//
// Stacks one table kind across every team document of a season.

use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Float64Array, Int64Array, StringArray},
    compute::concat_batches,
    record_batch::RecordBatch,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::frame::{constant_int, constant_text, drop_columns, fill_zero, text_column, with_column};
use super::load::{Layout, TableLoader};
use super::utils::{height_to_inches, parse_experience, parse_salary_millions, Position};
use crate::config::{DataLayout, TeamDirectory};
use crate::error::PipelineError;
use crate::schema::tables::{PER_GAME, ROSTER, SALARY, TEAM, YEAR};
use crate::schema::TableKind;

/// Per-game numeric columns whose missing cells count as zero.
const PER_GAME_NUMERIC: &[&str] = &[
    "Age", "G", "GS", "FG", "FGA", "FG%", "3P", "3PA", "3P%", "2P", "2PA", "2P%", "FT", "FTA",
    "FT%", "ORB", "DRB", "TRB", "AST", "STL", "BLK", "TOV", "PF", "PTS",
];

fn layout_for(kind: TableKind) -> Layout {
    match kind {
        TableKind::Roster => Layout::Fixed(&ROSTER),
        TableKind::PerGame => Layout::Fixed(&PER_GAME),
        TableKind::Salary => Layout::Fixed(&SALARY),
        TableKind::Advanced => Layout::Advanced,
    }
}

/// Loads and stacks per-team tables for one season.
pub struct SeasonAggregator<'a> {
    layout: &'a DataLayout,
    teams: &'a TeamDirectory,
    year: i32,
}

impl<'a> SeasonAggregator<'a> {
    pub fn new(layout: &'a DataLayout, teams: &'a TeamDirectory, year: i32) -> Self {
        Self {
            layout,
            teams,
            year,
        }
    }

    /// Stack `kind` across all teams with a document for this season.
    ///
    /// Teams without a document are skipped. If no team has one, the season
    /// has no raw data at all and `PipelineError::NoRawData` is returned.
    #[instrument(level = "info", skip(self, loader), fields(year = self.year, table = kind.as_str()))]
    pub fn aggregate(&self, loader: &mut TableLoader, kind: TableKind) -> Result<RecordBatch> {
        let source = layout_for(kind);
        let mut parts = Vec::new();
        let mut found = 0usize;

        for team in self.teams.teams(self.year) {
            let path = self.layout.team_file(self.year, &team);
            let exists = path.is_file();
            // the loader records absent documents as missing
            let batch = loader.load(&path, source);
            if !exists {
                debug!(team = %team, "no document");
                continue;
            }
            found += 1;
            parts.push(self.tag(batch, kind, &team)?);
        }

        if found == 0 {
            return Err(PipelineError::NoRawData {
                dir: self.layout.team_dir(self.year),
            }
            .into());
        }

        let template = self.tag(source.empty(), kind, "")?;
        let stacked = concat_batches(&template.schema(), &parts)
            .with_context(|| format!("stacking {} tables for {}", kind.as_str(), self.year))?;
        info!(teams = found, rows = stacked.num_rows(), "stacked");

        match kind {
            TableKind::Roster => clean_roster(&stacked),
            TableKind::PerGame => clean_per_game(&stacked),
            TableKind::Salary => clean_salary(&stacked),
            TableKind::Advanced => drop_columns(&stacked, &["Rk", "Age", "G"]),
        }
    }

    fn tag(&self, batch: RecordBatch, kind: TableKind, team: &str) -> Result<RecordBatch> {
        let rows = batch.num_rows();
        let batch = with_column(&batch, YEAR, constant_int(self.year as i64, rows))?;
        if kind == TableKind::Roster {
            with_column(&batch, TEAM, constant_text(team, rows))
        } else {
            Ok(batch)
        }
    }
}

/// Canonical positions, height in inches, numeric experience, weight
/// defaulting to 0.
pub fn clean_roster(batch: &RecordBatch) -> Result<RecordBatch> {
    let mut out = drop_columns(batch, &["No."])?;

    if let Some(pos) = text_column(&out, "Pos") {
        let normalized: StringArray = pos
            .iter()
            .map(|p| p.and_then(Position::normalize).map(|p| p.as_str()))
            .collect();
        out = with_column(&out, "Pos", Arc::new(normalized))?;
    }

    if let Some(ht) = text_column(&out, "Ht") {
        let inches: Int64Array = ht.iter().map(|h| Some(height_to_inches(h))).collect();
        out = with_column(&out, "Ht", Arc::new(inches))?;
    }

    if let Some(exp) = text_column(&out, "Experience") {
        let years: Int64Array = exp.iter().map(|e| e.and_then(parse_experience)).collect();
        out = with_column(&out, "Experience", Arc::new(years))?;
    }

    fill_zero(&out, &["Wt"])
}

pub fn clean_per_game(batch: &RecordBatch) -> Result<RecordBatch> {
    let out = drop_columns(batch, &["ind", "MP"])?;
    fill_zero(&out, PER_GAME_NUMERIC)
}

/// Salary strings become millions of dollars.
pub fn clean_salary(batch: &RecordBatch) -> Result<RecordBatch> {
    let out = drop_columns(batch, &["ind"])?;
    let Some(salary) = text_column(&out, "Salary") else {
        return Ok(out);
    };
    let millions: Float64Array = salary
        .iter()
        .map(|s| s.and_then(parse_salary_millions))
        .collect();
    with_column(&out, "Salary", Arc::new(millions) as ArrayRef)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, AsArray};
    use arrow::datatypes::{Float64Type, Int64Type};
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::tempdir;

    fn page(tables: &[(&str, &[&[&str]])]) -> String {
        let mut html = String::from("<html><body>");
        for (id, rows) in tables {
            html.push_str(&format!(r#"<table id="{}"><tbody>"#, id));
            for r in rows.iter() {
                html.push_str("<tr>");
                for c in r.iter() {
                    html.push_str(&format!("<td>{}</td>", c));
                }
                html.push_str("</tr>");
            }
            html.push_str("</tbody></table>");
        }
        html.push_str("</body></html>");
        html
    }

    fn directory(teams: &[&str]) -> TeamDirectory {
        let mut o = BTreeMap::new();
        o.insert(2015, teams.iter().map(|t| t.to_string()).collect());
        TeamDirectory::with_overrides(o)
    }

    #[test]
    fn no_documents_is_configuration_failure() {
        let dir = tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        let teams = directory(&["AAA", "BBB"]);
        let mut loader = TableLoader::new();
        let err = SeasonAggregator::new(&layout, &teams, 2015)
            .aggregate(&mut loader, TableKind::Roster)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::NoRawData { .. })
        ));
    }

    #[test]
    fn roster_stacks_teams_and_cleans_columns() {
        let dir = tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        fs::create_dir_all(layout.team_dir(2015)).unwrap();
        fs::write(
            layout.team_file(2015, "AAA"),
            page(&[("roster", &[&["1", "A", "G-F", "6-7", "", "x", "R", "Duke"]])]),
        )
        .unwrap();
        fs::write(
            layout.team_file(2015, "BBB"),
            page(&[("roster", &[&["2", "B", "C", "7-0", "250", "x", "5", ""]])]),
        )
        .unwrap();
        // CCC has no document: tolerated
        let teams = directory(&["AAA", "BBB", "CCC"]);
        let mut loader = TableLoader::new();
        let b = SeasonAggregator::new(&layout, &teams, 2015)
            .aggregate(&mut loader, TableKind::Roster)
            .unwrap();

        assert_eq!(b.num_rows(), 2);
        assert_eq!(loader.report().missing, vec![layout.team_file(2015, "CCC")]);
        assert_eq!(loader.report().loaded, 2);
        assert!(b.column_by_name("No.").is_none());
        let team = b.column_by_name("Team").unwrap().as_string::<i32>();
        assert_eq!((team.value(0), team.value(1)), ("AAA", "BBB"));
        let pos = b.column_by_name("Pos").unwrap().as_string::<i32>();
        assert_eq!((pos.value(0), pos.value(1)), ("SG", "C"));
        let ht = b.column_by_name("Ht").unwrap().as_primitive::<Int64Type>();
        assert_eq!((ht.value(0), ht.value(1)), (79, 84));
        let wt = b.column_by_name("Wt").unwrap().as_primitive::<Int64Type>();
        assert_eq!((wt.value(0), wt.value(1)), (0, 250));
        let exp = b.column_by_name("Experience").unwrap().as_primitive::<Int64Type>();
        assert_eq!((exp.value(0), exp.value(1)), (0, 5));
        let year = b.column_by_name("year").unwrap().as_primitive::<Int64Type>();
        assert_eq!(year.value(1), 2015);
    }

    #[test]
    fn salary_and_per_game_cleanup() {
        let dir = tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        fs::create_dir_all(layout.team_dir(2015)).unwrap();
        let mut per_game: Vec<&str> = vec!["1", "A", "25", "82", "80", "34.1"];
        per_game.extend(std::iter::repeat("1.0").take(21));
        per_game[8] = "";
        fs::write(
            layout.team_file(2015, "AAA"),
            page(&[
                ("salaries", &[&["1", "A", "$12,345,678"]]),
                ("per_game", &[&per_game[..]]),
            ]),
        )
        .unwrap();
        let teams = directory(&["AAA"]);
        let mut loader = TableLoader::new();
        let agg = SeasonAggregator::new(&layout, &teams, 2015);

        let sal = agg.aggregate(&mut loader, TableKind::Salary).unwrap();
        assert!(sal.column_by_name("ind").is_none());
        let s = sal.column_by_name("Salary").unwrap().as_primitive::<Float64Type>();
        assert_eq!(s.value(0), 12.346);

        let pg = agg.aggregate(&mut loader, TableKind::PerGame).unwrap();
        assert!(pg.column_by_name("MP").is_none());
        assert!(pg.column_by_name("ind").is_none());
        let fg_pct = pg.column_by_name("FG%").unwrap();
        assert_eq!(fg_pct.null_count(), 0);
        assert_eq!(fg_pct.as_primitive::<Float64Type>().value(0), 0.0);
    }
}
