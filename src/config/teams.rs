// src/config/teams.rs

use std::collections::BTreeMap;

/// A franchise code and the seasons (by ending year) it was used.
struct Franchise {
    code: &'static str,
    first: i32,
    last: i32,
}

const fn f(code: &'static str, first: i32, last: i32) -> Franchise {
    Franchise { code, first, last }
}

const OPEN: i32 = i32::MAX;

/// Team codes as used in the saved page file names, with relocations and
/// renames as separate entries.
const FRANCHISES: &[Franchise] = &[
    f("ATL", 0, OPEN),
    f("BOS", 0, OPEN),
    f("NJN", 0, 2012),
    f("BRK", 2013, OPEN),
    f("CHH", 0, 2002),
    f("CHA", 2005, 2014),
    f("CHO", 2015, OPEN),
    f("CHI", 0, OPEN),
    f("CLE", 0, OPEN),
    f("DAL", 0, OPEN),
    f("DEN", 0, OPEN),
    f("DET", 0, OPEN),
    f("GSW", 0, OPEN),
    f("HOU", 0, OPEN),
    f("IND", 0, OPEN),
    f("LAC", 0, OPEN),
    f("LAL", 0, OPEN),
    f("VAN", 1996, 2001),
    f("MEM", 2002, OPEN),
    f("MIA", 0, OPEN),
    f("MIL", 0, OPEN),
    f("MIN", 0, OPEN),
    f("NOH", 2003, 2005),
    f("NOK", 2006, 2007),
    f("NOH", 2008, 2013),
    f("NOP", 2014, OPEN),
    f("NYK", 0, OPEN),
    f("SEA", 0, 2008),
    f("OKC", 2009, OPEN),
    f("ORL", 0, OPEN),
    f("PHI", 0, OPEN),
    f("PHO", 0, OPEN),
    f("POR", 0, OPEN),
    f("SAC", 0, OPEN),
    f("SAS", 0, OPEN),
    f("TOR", 1996, OPEN),
    f("UTA", 0, OPEN),
    f("WSB", 0, 1997),
    f("WAS", 1998, OPEN),
];

/// Which team documents make up a season. Built from the franchise table
/// unless a season is overridden explicitly.
#[derive(Debug, Clone, Default)]
pub struct TeamDirectory {
    overrides: BTreeMap<i32, Vec<String>>,
}

impl TeamDirectory {
    /// The built-in franchise history, no overrides.
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Use exactly `teams` for the given seasons; other seasons fall back
    /// to the built-in table.
    pub fn with_overrides(overrides: BTreeMap<i32, Vec<String>>) -> Self {
        Self { overrides }
    }

    pub fn teams(&self, year: i32) -> Vec<String> {
        if let Some(teams) = self.overrides.get(&year) {
            return teams.clone();
        }
        FRANCHISES
            .iter()
            .filter(|fr| fr.first <= year && year <= fr.last)
            .map(|fr| fr.code.to_string())
            .collect()
    }
}
