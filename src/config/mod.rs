// src/config/mod.rs

pub mod teams;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

pub use teams::TeamDirectory;

/// Auction league settings used by the value and price stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueSettings {
    /// Fantasy teams in the league.
    pub teams: u32,
    /// Players drafted per fantasy team.
    pub roster_size: u32,
    /// Auction dollars per fantasy team.
    pub budget: f64,
    pub min_bid: f64,
    /// Per-game minutes below which a player is valued at 0.
    pub min_minutes: f64,
    /// League-wide FG% that shooting impact is measured against.
    pub reference_fg_pct: f64,
    pub reference_ft_pct: f64,
}

impl Default for LeagueSettings {
    fn default() -> Self {
        Self {
            teams: 10,
            roster_size: 13,
            budget: 200.0,
            min_bid: 1.0,
            min_minutes: 10.0,
            reference_fg_pct: 0.46,
            reference_ft_pct: 0.77,
        }
    }
}

impl LeagueSettings {
    pub fn draftable(&self) -> usize {
        (self.teams * self.roster_size) as usize
    }
}

/// Weight of each scoring category in the value score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryWeights {
    pub fg_pct: f64,
    pub ft_pct: f64,
    pub threes: f64,
    pub rebounds: f64,
    pub assists: f64,
    pub steals: f64,
    pub blocks: f64,
    pub points: f64,
    /// Applied to the negated turnover z-score.
    pub turnovers: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            fg_pct: 1.0,
            ft_pct: 1.0,
            threes: 1.0,
            rebounds: 1.0,
            assists: 1.0,
            steals: 1.0,
            blocks: 1.0,
            points: 1.0,
            turnovers: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of `raw_data/`, `processed_data/` and `html/`.
    pub data_dir: Option<PathBuf>,
    pub league: LeagueSettings,
    pub weights: CategoryWeights,
    /// Per-season team code lists replacing the built-in franchise table.
    pub teams: BTreeMap<i32, Vec<String>>,
}

impl Config {
    /// Read a YAML config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
        serde_yaml::from_str(&text).with_context(|| format!("parsing config {:?}", path))
    }

    pub fn team_directory(&self) -> TeamDirectory {
        TeamDirectory::with_overrides(self.teams.clone())
    }
}

/// Where each season's inputs and outputs live under a data directory.
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn team_dir(&self, year: i32) -> PathBuf {
        self.root.join("raw_data").join("teams").join(year.to_string())
    }

    pub fn team_file(&self, year: i32, team: &str) -> PathBuf {
        self.team_dir(year).join(format!("{}.html", team))
    }

    pub fn draft_dir(&self) -> PathBuf {
        self.root.join("raw_data").join("draft")
    }

    pub fn league_rosters(&self, year: i32) -> PathBuf {
        self.root
            .join("raw_data")
            .join("league")
            .join(year.to_string())
            .join("rosters.json")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.root.join("processed_data")
    }

    pub fn player_table(&self, year: i32) -> PathBuf {
        self.processed_dir().join(year.to_string()).join("team_data.parquet")
    }

    pub fn fantasy_team_table(&self, year: i32) -> PathBuf {
        self.processed_dir()
            .join(year.to_string())
            .join("fantasy_team_data.parquet")
    }

    pub fn html_dir(&self) -> PathBuf {
        self.root.join("html")
    }
}
