// src/augment/fantasy.rs
//
// Which fantasy team, if any, owns each player.

use anyhow::{Context, Result};
use arrow::{array::StringArray, record_batch::RecordBatch};
use std::{collections::BTreeMap, fs, path::Path, sync::Arc};
use tracing::{debug, info, instrument, warn};

use super::{mark, Stage};
use crate::process::frame::{require_text, with_column};
use crate::schema::tables::PLAYER;

pub const FANTASY_TEAM: &str = "Fantasy Team";
/// Label for players no fantasy team owns.
pub const FREE_AGENT: &str = "FA";

/// Player name → fantasy team label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FantasyRosters {
    owner: BTreeMap<String, String>,
}

impl FantasyRosters {
    /// Build from label → player names. Labels are visited in sorted order,
    /// so a player listed twice ends up with the last label.
    pub fn from_teams(teams: BTreeMap<String, Vec<String>>) -> Self {
        let mut owner = BTreeMap::new();
        for (label, players) in teams {
            for player in players {
                if let Some(prev) = owner.insert(player.clone(), label.clone()) {
                    warn!(%player, %prev, now = %label, "player on two fantasy rosters");
                }
            }
        }
        Self { owner }
    }

    /// Read a `{"label": ["player", ...]}` JSON file. A missing file means
    /// nobody is rostered yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            debug!(path = %path.display(), "no fantasy rosters");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading rosters {}", path.display()))?;
        let teams: BTreeMap<String, Vec<String>> = serde_json::from_str(&text)
            .with_context(|| format!("parsing rosters {}", path.display()))?;
        info!(teams = teams.len(), "fantasy rosters loaded");
        Ok(Self::from_teams(teams))
    }

    pub fn owner(&self, player: &str) -> &str {
        self.owner.get(player).map_or(FREE_AGENT, String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.owner.is_empty()
    }
}

/// Add the `Fantasy Team` column: the owning label, or `FA`.
#[instrument(level = "info", skip_all, fields(rows = batch.num_rows()))]
pub fn augment_fantasy_teams(batch: RecordBatch, rosters: &FantasyRosters) -> Result<RecordBatch> {
    let names = require_text(&batch, PLAYER)?;
    let labels: StringArray = names
        .iter()
        .map(|n| Some(n.map_or(FREE_AGENT, |n| rosters.owner(n))))
        .collect();
    let owned = labels.iter().filter(|l| *l != Some(FREE_AGENT)).count();
    debug!(owned, "fantasy owners assigned");
    let out = with_column(&batch, FANTASY_TEAM, Arc::new(labels))?;
    mark(out, Stage::FantasyTeams)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::augment::test_support::players;
    use arrow::array::AsArray;

    fn rosters(json: &str) -> FantasyRosters {
        FantasyRosters::from_teams(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn unlisted_players_are_free_agents() {
        let r = rosters(r#"{"Bricklayers": ["A"], "Monstars": ["C"]}"#);
        let out = augment_fantasy_teams(players(&["A", "B", "C"], &[]), &r).unwrap();
        let col = out.column_by_name(FANTASY_TEAM).unwrap().as_string::<i32>();
        let labels: Vec<_> = col.iter().flatten().collect();
        assert_eq!(labels, vec!["Bricklayers", FREE_AGENT, "Monstars"]);
    }

    #[test]
    fn double_listed_player_keeps_last_label() {
        let r = rosters(r#"{"Zebras": ["A"], "Antelopes": ["A"]}"#);
        assert_eq!(r.owner("A"), "Zebras");
    }

    #[test]
    fn missing_file_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let r = FantasyRosters::load(&tmp.path().join("rosters.json")).unwrap();
        assert!(r.is_empty());
        assert_eq!(r.owner("anyone"), FREE_AGENT);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rosters.json");
        fs::write(&path, "[1, 2").unwrap();
        assert!(FantasyRosters::load(&path).is_err());
    }
}
