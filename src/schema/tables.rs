// src/schema/tables.rs
//
// Positional layouts of the scraped tables. Header text in the source pages
// repeats names (e.g. two "MP" columns in some seasons), so the names below
// are authoritative and applied by position.

use super::types::{Column, TableSchema};

/// Which per-team table a load targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Roster,
    PerGame,
    Salary,
    Advanced,
}

impl TableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Roster => "roster",
            TableKind::PerGame => "per_game",
            TableKind::Salary => "salaries",
            TableKind::Advanced => "advanced",
        }
    }
}

pub const PLAYER: &str = "Player";
pub const YEAR: &str = "year";
pub const TEAM: &str = "Team";

pub const ROSTER: TableSchema = TableSchema {
    table_id: "roster",
    columns: &[
        Column::text("No."),
        Column::text("Player"),
        Column::text("Pos"),
        Column::text("Ht"),
        Column::int("Wt"),
        Column::text("Birth Date"),
        Column::text("Experience"),
        Column::text("College"),
    ],
};

pub const PER_GAME: TableSchema = TableSchema {
    table_id: "per_game",
    columns: &[
        Column::text("ind"),
        Column::text("Player"),
        Column::int("Age"),
        Column::int("G"),
        Column::int("GS"),
        Column::float("MP"),
        Column::float("FG"),
        Column::float("FGA"),
        Column::float("FG%"),
        Column::float("3P"),
        Column::float("3PA"),
        Column::float("3P%"),
        Column::float("2P"),
        Column::float("2PA"),
        Column::float("2P%"),
        Column::float("FT"),
        Column::float("FTA"),
        Column::float("FT%"),
        Column::float("ORB"),
        Column::float("DRB"),
        Column::float("TRB"),
        Column::float("AST"),
        Column::float("STL"),
        Column::float("BLK"),
        Column::float("TOV"),
        Column::float("PF"),
        Column::float("PTS"),
    ],
};

pub const SALARY: TableSchema = TableSchema {
    table_id: "salaries",
    columns: &[
        Column::text("ind"),
        Column::text("Player"),
        Column::text("Salary"),
    ],
};

pub const DRAFT: TableSchema = TableSchema {
    table_id: "stats",
    columns: &[
        Column::text("Rk"),
        Column::int("Pk"),
        Column::text("Tm"),
        Column::text("Player"),
        Column::text("College"),
        Column::text("G"),
        Column::text("MP"),
        Column::text("PTS"),
        Column::text("TRB"),
        Column::text("AST"),
        Column::text("FG%"),
        Column::text("3P%"),
        Column::text("FT%"),
        Column::text("MP_PG"),
        Column::text("PTS_PG"),
        Column::text("TRB_PG"),
        Column::text("AST_PG"),
        Column::text("WS"),
        Column::text("WS/48"),
    ],
};

/// Older advanced layout: carries eFG%, ORtg and DRtg, no box plus-minus.
pub const ADVANCED_V1: TableSchema = TableSchema {
    table_id: "advanced",
    columns: &[
        Column::int("Rk"),
        Column::text("Player"),
        Column::int("Age"),
        Column::int("G"),
        Column::int("MP"),
        Column::float("PER"),
        Column::float("TS%"),
        Column::float("eFG%"),
        Column::float("FTr"),
        Column::float("3PAr"),
        Column::float("ORB%"),
        Column::float("DRB%"),
        Column::float("TRB%"),
        Column::float("AST%"),
        Column::float("STL%"),
        Column::float("BLK%"),
        Column::float("TOV%"),
        Column::float("USG%"),
        Column::float("ORtg"),
        Column::float("DRtg"),
        Column::float("OWS"),
        Column::float("DWS"),
        Column::float("WS"),
        Column::float("WS/48"),
    ],
};

/// Newer advanced layout: box plus-minus family and VORP at the end.
pub const ADVANCED_V2: TableSchema = TableSchema {
    table_id: "advanced",
    columns: &[
        Column::int("Rk"),
        Column::text("Player"),
        Column::int("Age"),
        Column::int("G"),
        Column::int("MP"),
        Column::float("PER"),
        Column::float("TS%"),
        Column::float("3PAr"),
        Column::float("FTr"),
        Column::float("ORB%"),
        Column::float("DRB%"),
        Column::float("TRB%"),
        Column::float("AST%"),
        Column::float("STL%"),
        Column::float("BLK%"),
        Column::float("TOV%"),
        Column::float("USG%"),
        Column::float("OWS"),
        Column::float("DWS"),
        Column::float("WS"),
        Column::float("WS/48"),
        Column::float("OBPM"),
        Column::float("DBPM"),
        Column::float("BPM"),
        Column::float("VORP"),
    ],
};

/// Season-stable advanced column set: V2 order, then the V1-only columns.
/// Both layouts are projected onto this before stacking.
pub const ADVANCED_CANONICAL: &[Column] = &[
    Column::int("Rk"),
    Column::text("Player"),
    Column::int("Age"),
    Column::int("G"),
    Column::int("MP"),
    Column::float("PER"),
    Column::float("TS%"),
    Column::float("3PAr"),
    Column::float("FTr"),
    Column::float("ORB%"),
    Column::float("DRB%"),
    Column::float("TRB%"),
    Column::float("AST%"),
    Column::float("STL%"),
    Column::float("BLK%"),
    Column::float("TOV%"),
    Column::float("USG%"),
    Column::float("OWS"),
    Column::float("DWS"),
    Column::float("WS"),
    Column::float("WS/48"),
    Column::float("OBPM"),
    Column::float("DBPM"),
    Column::float("BPM"),
    Column::float("VORP"),
    Column::float("eFG%"),
    Column::float("ORtg"),
    Column::float("DRtg"),
];

/// The two known advanced-table layouts, told apart by how many columns
/// carry any data once blank spacer columns are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvancedSchema {
    V1,
    V2,
}

impl AdvancedSchema {
    pub fn detect(non_empty_columns: usize) -> Option<Self> {
        match non_empty_columns {
            n if n == ADVANCED_V1.width() => Some(AdvancedSchema::V1),
            n if n == ADVANCED_V2.width() => Some(AdvancedSchema::V2),
            _ => None,
        }
    }

    pub fn schema(&self) -> &'static TableSchema {
        match self {
            AdvancedSchema::V1 => &ADVANCED_V1,
            AdvancedSchema::V2 => &ADVANCED_V2,
        }
    }
}
