// src/process/utils.rs

use once_cell::sync::Lazy;
use regex::Regex;

/// Cell text without surrounding whitespace.
pub fn clean_str(raw: &str) -> &str {
    raw.trim()
}

/// Round half away from zero to `places` decimals.
pub fn round_to(v: f64, places: u32) -> f64 {
    let m = 10f64.powi(places as i32);
    (v * m).round() / m
}

/// `"6-7"` → 79. Anything that is not `<feet>-<inches>` yields 0.
pub fn height_to_inches(s: Option<&str>) -> i64 {
    let Some(s) = s else { return 0 };
    let mut parts = clean_str(s).split('-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(ft), Some(inch), None) => match (ft.trim().parse::<i64>(), inch.trim().parse::<i64>()) {
            (Ok(ft), Ok(inch)) => ft * 12 + inch,
            _ => 0,
        },
        _ => 0,
    }
}

static CURRENCY_NOISE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[$,]").expect("static regex"));

/// `"$12,345,678"` → 12.346 (millions, three decimals).
pub fn parse_salary_millions(s: &str) -> Option<f64> {
    let stripped = CURRENCY_NOISE.replace_all(clean_str(s), "");
    let dollars: f64 = stripped.trim().parse().ok()?;
    Some(round_to(dollars / 1e6, 3))
}

/// Years of experience; the source writes rookies as `R`.
pub fn parse_experience(s: &str) -> Option<i64> {
    match clean_str(s) {
        "R" => Some(0),
        other => other.parse().ok(),
    }
}

/// The five canonical position slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Center,
    PowerForward,
    SmallForward,
    ShootingGuard,
    PointGuard,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Center => "C",
            Position::PowerForward => "PF",
            Position::SmallForward => "SF",
            Position::ShootingGuard => "SG",
            Position::PointGuard => "PG",
        }
    }

    fn from_slot(s: &str) -> Option<Self> {
        match s {
            "C" => Some(Position::Center),
            "PF" | "F" => Some(Position::PowerForward),
            "SF" => Some(Position::SmallForward),
            "SG" | "G" => Some(Position::ShootingGuard),
            "PG" => Some(Position::PointGuard),
            _ => None,
        }
    }

    /// Map a roster position label onto one slot.
    ///
    /// Explicit substitutions come first; any other combo label takes its
    /// first component, with generic `F`/`G` landing on PF/SG.
    pub fn normalize(label: &str) -> Option<Self> {
        let label = clean_str(label);
        let explicit = match label {
            "PF-SF" => Some(Position::PowerForward),
            "PG-SG" => Some(Position::PointGuard),
            "SF-PF" | "SF-SG" => Some(Position::SmallForward),
            "G-F" | "G-PF" | "G" => Some(Position::ShootingGuard),
            "F" => Some(Position::PowerForward),
            _ => None,
        };
        explicit.or_else(|| label.split('-').next().and_then(|s| Self::from_slot(s.trim())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn height_conversion() {
        assert_eq!(height_to_inches(Some("6-7")), 79);
        assert_eq!(height_to_inches(Some("7-0")), 84);
        assert_eq!(height_to_inches(Some("6'7\"")), 0);
        assert_eq!(height_to_inches(Some("6-7-1")), 0);
        assert_eq!(height_to_inches(Some("")), 0);
        assert_eq!(height_to_inches(None), 0);
    }

    #[test]
    fn salary_in_millions() {
        assert_eq!(parse_salary_millions("$12,345,678"), Some(12.346));
        assert_eq!(parse_salary_millions("$500,000"), Some(0.5));
        assert_eq!(parse_salary_millions(""), None);
        assert_eq!(parse_salary_millions("Two-Way"), None);
    }

    #[test]
    fn experience_rookie_is_zero() {
        assert_eq!(parse_experience("R"), Some(0));
        assert_eq!(parse_experience(" 7 "), Some(7));
        assert_eq!(parse_experience("n/a"), None);
    }

    #[test]
    fn positions_collapse_to_five_slots() {
        let cases = [
            ("C", "C"),
            ("PF-SF", "PF"),
            ("PG-SG", "PG"),
            ("SF-PF", "SF"),
            ("SF-SG", "SF"),
            ("G", "SG"),
            ("G-F", "SG"),
            ("G-PF", "SG"),
            ("F", "PF"),
            ("F-C", "PF"),
            ("C-PF", "C"),
            ("SG-PG", "SG"),
        ];
        for (raw, want) in cases {
            assert_eq!(Position::normalize(raw).map(|p| p.as_str()), Some(want), "{}", raw);
        }
        assert_eq!(Position::normalize("Coach"), None);
        assert_eq!(Position::normalize(""), None);
    }

    #[test]
    fn cell_text_is_only_trimmed() {
        assert_eq!(clean_str("  Tim Duncan\t"), "Tim Duncan");
        assert_eq!(clean_str("\"Big Shot\" Bob"), "\"Big Shot\" Bob");
        assert_eq!(clean_str(" \"6-7\" "), "\"6-7\"");
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(1.2346, 3), 1.235);
        assert_eq!(round_to(-0.5, 0), -1.0);
    }
}
