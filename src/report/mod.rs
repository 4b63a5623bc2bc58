// src/report/mod.rs
//
// Static HTML pages over the persisted season tables.

pub mod html;

use anyhow::{Context, Result};
use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

use crate::config::DataLayout;
use crate::store::read_table;

/// Which persisted table a page is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSource {
    /// `team_data.parquet`
    Players,
    /// `fantasy_team_data.parquet`
    FantasyTeams,
}

impl PageSource {
    pub fn path(&self, layout: &DataLayout, year: i32) -> PathBuf {
        match self {
            PageSource::Players => layout.player_table(year),
            PageSource::FantasyTeams => layout.fantasy_team_table(year),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLayout {
    /// One table, rows in stored order.
    Plain,
    /// One table per playing position.
    ByPosition,
}

#[derive(Debug, Clone, Copy)]
pub struct PageDescriptor {
    pub title: &'static str,
    /// File name under `html/<year>/`.
    pub href: &'static str,
    pub table_id: &'static str,
    pub source: PageSource,
    /// Columns in display order; ones a season lacks are skipped.
    pub columns: &'static [&'static str],
    pub layout: PageLayout,
}

/// Every page, in table-of-contents order.
pub const PAGES: &[PageDescriptor] = &[
    PageDescriptor {
        title: "Value Data",
        href: "value-data.html",
        table_id: "value",
        source: PageSource::Players,
        columns: &[
            "Player", "Pos", "GS", "MP", "FG%", "FT%", "TRB", "AST", "STL", "BLK", "PTS",
            "Salary", "value", "price",
        ],
        layout: PageLayout::ByPosition,
    },
    PageDescriptor {
        title: "Fantasy Team Averages",
        href: "fantasy-teams.html",
        table_id: "fantasy_teams",
        source: PageSource::FantasyTeams,
        columns: &[
            "Fantasy Team", "Age", "G", "MP", "FG%", "FT%", "3P", "TRB", "AST", "STL", "BLK",
            "PTS", "Salary", "PER", "WS", "value", "price",
        ],
        layout: PageLayout::Plain,
    },
    PageDescriptor {
        title: "Draft Pedigree",
        href: "draft.html",
        table_id: "draft",
        source: PageSource::Players,
        columns: &[
            "Player", "Pos", "Team", "draft_year", "Pk", "draft_team", "Experience", "value",
            "price",
        ],
        layout: PageLayout::Plain,
    },
];

/// Seasons with at least one persisted table, ascending.
pub fn discover_seasons(layout: &DataLayout) -> Result<Vec<i32>> {
    let pattern = layout.processed_dir().join("*").join("*.parquet");
    let mut years = BTreeSet::new();
    for entry in glob::glob(&pattern.to_string_lossy()).context("invalid season glob")? {
        let path = entry.context("reading processed data directory")?;
        if let Some(year) = path
            .parent()
            .and_then(Path::file_name)
            .and_then(|n| n.to_str())
            .and_then(|n| n.parse::<i32>().ok())
        {
            years.insert(year);
        }
    }
    Ok(years.into_iter().collect())
}

/// Render every registered page for every season that has its source
/// table, plus `html/toc.html`. Returns the files written.
#[instrument(level = "info", skip_all, fields(root = %layout.root().display()))]
pub fn write_html(layout: &DataLayout) -> Result<Vec<PathBuf>> {
    let seasons = discover_seasons(layout)?;
    let html_dir = layout.html_dir();
    let mut written = Vec::new();
    let mut toc = Vec::new();

    for &year in &seasons {
        let year_dir = html_dir.join(year.to_string());
        for page in PAGES {
            let source = page.source.path(layout, year);
            if !source.is_file() {
                debug!(year, page = page.href, "source table missing; page skipped");
                continue;
            }
            let batch = read_table(&source)?;
            let text = html::render_page(page, year, &batch)
                .with_context(|| format!("rendering {} for {}", page.href, year))?;
            fs::create_dir_all(&year_dir)
                .with_context(|| format!("creating {}", year_dir.display()))?;
            let out = year_dir.join(page.href);
            fs::write(&out, text).with_context(|| format!("writing {}", out.display()))?;
            written.push(out);
            toc.push((year, page));
        }
    }

    fs::create_dir_all(&html_dir).with_context(|| format!("creating {}", html_dir.display()))?;
    let toc_path = html_dir.join("toc.html");
    fs::write(&toc_path, html::render_toc(&toc)?)
        .with_context(|| format!("writing {}", toc_path.display()))?;
    written.push(toc_path);

    info!(seasons = seasons.len(), files = written.len(), "html written");
    Ok(written)
}
