use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Pitcher,
    Catcher,
    First,
    Second,
    Shortstop,
    Third,
    Left,
    Center,
    Right,
}

impl Position {
    /// Display order used by the roster panel and the album.
    pub const ALL: [Position; 9] = [
        Position::Pitcher,
        Position::Catcher,
        Position::First,
        Position::Second,
        Position::Shortstop,
        Position::Third,
        Position::Left,
        Position::Center,
        Position::Right,
    ];

    pub const BATTING: [Position; 8] = [
        Position::Catcher,
        Position::First,
        Position::Second,
        Position::Shortstop,
        Position::Third,
        Position::Left,
        Position::Center,
        Position::Right,
    ];

    /// Query-string key understood by the backend.
    pub fn key(self) -> &'static str {
        match self {
            Position::Pitcher => "pitcher",
            Position::Catcher => "catcher",
            Position::First => "first",
            Position::Second => "second",
            Position::Shortstop => "shortstop",
            Position::Third => "third",
            Position::Left => "left",
            Position::Center => "center",
            Position::Right => "right",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Position::Pitcher => "Pitcher",
            Position::Catcher => "Catcher",
            Position::First => "First Base",
            Position::Second => "Second Base",
            Position::Shortstop => "Shortstop",
            Position::Third => "Third Base",
            Position::Left => "Left Field",
            Position::Center => "Center Field",
            Position::Right => "Right Field",
        }
    }

    pub fn abbr(self) -> &'static str {
        match self {
            Position::Pitcher => "P",
            Position::Catcher => "C",
            Position::First => "1B",
            Position::Second => "2B",
            Position::Shortstop => "SS",
            Position::Third => "3B",
            Position::Left => "LF",
            Position::Center => "CF",
            Position::Right => "RF",
        }
    }

    pub fn is_pitcher(self) -> bool {
        self == Position::Pitcher
    }

    /// Accepts backend keys, the Korean display names and scorebook abbreviations.
    pub fn parse(raw: &str) -> Option<Position> {
        let cleaned = raw.trim();
        if cleaned.is_empty() {
            return None;
        }
        let pos = match cleaned.to_lowercase().as_str() {
            "pitcher" | "p" | "sp" | "rp" | "투수" => Position::Pitcher,
            "catcher" | "c" | "포수" => Position::Catcher,
            "first" | "1b" | "first base" | "1루수" => Position::First,
            "second" | "2b" | "second base" | "2루수" => Position::Second,
            "shortstop" | "ss" | "유격수" => Position::Shortstop,
            "third" | "3b" | "third base" | "3루수" => Position::Third,
            "left" | "lf" | "left field" | "좌익수" => Position::Left,
            "center" | "cf" | "center field" | "중견수" => Position::Center,
            "right" | "rf" | "right field" | "우익수" => Position::Right,
            _ => return None,
        };
        Some(pos)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    pub name: String,
    pub back_number: Option<u32>,
    pub team: String,
    pub position: Position,
    #[serde(default)]
    pub batting_average: Option<f64>,
    #[serde(default)]
    pub rbis: Option<f64>,
    #[serde(default)]
    pub home_runs: Option<f64>,
    #[serde(default)]
    pub stolen_bases: Option<f64>,
    #[serde(default)]
    pub era: Option<f64>,
    #[serde(default)]
    pub wins: Option<f64>,
    #[serde(default)]
    pub losses: Option<f64>,
    #[serde(default)]
    pub saves: Option<f64>,
    #[serde(default)]
    pub holds: Option<f64>,
    #[serde(default)]
    pub strikeouts: Option<f64>,
}

impl Player {
    pub fn new(id: u32, name: &str, team: &str, position: Position) -> Self {
        Self {
            id,
            name: name.to_string(),
            back_number: None,
            team: team.to_string(),
            position,
            batting_average: None,
            rbis: None,
            home_runs: None,
            stolen_bases: None,
            era: None,
            wins: None,
            losses: None,
            saves: None,
            holds: None,
            strikeouts: None,
        }
    }

    pub fn number_label(&self) -> String {
        self.back_number
            .map(|n| format!("#{n}"))
            .unwrap_or_else(|| "#--".to_string())
    }

    /// Last whitespace-separated part of the name, for tight spots like field icons.
    pub fn short_name(&self) -> &str {
        self.name
            .split_whitespace()
            .last()
            .unwrap_or(self.name.as_str())
    }

    /// One-line stat summary matching the player's role.
    pub fn headline_stats(&self) -> String {
        if self.position.is_pitcher() {
            format!(
                "ERA {} W {} SO {}",
                fmt_opt(self.era, 2),
                fmt_opt(self.wins, 0),
                fmt_opt(self.strikeouts, 0)
            )
        } else {
            format!(
                "AVG {} HR {} RBI {} SB {}",
                fmt_avg(self.batting_average),
                fmt_opt(self.home_runs, 0),
                fmt_opt(self.rbis, 0),
                fmt_opt(self.stolen_bases, 0)
            )
        }
    }
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.decimals$}"),
        _ => "-".to_string(),
    }
}

fn fmt_avg(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => {
            let s = format!("{v:.3}");
            s.strip_prefix('0').map(str::to_string).unwrap_or(s)
        }
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keys_korean_and_abbreviations() {
        assert_eq!(Position::parse("shortstop"), Some(Position::Shortstop));
        assert_eq!(Position::parse(" SS "), Some(Position::Shortstop));
        assert_eq!(Position::parse("유격수"), Some(Position::Shortstop));
        assert_eq!(Position::parse("1B"), Some(Position::First));
        assert_eq!(Position::parse("중견수"), Some(Position::Center));
        assert_eq!(Position::parse("DH"), None);
        assert_eq!(Position::parse(""), None);
    }

    #[test]
    fn batting_positions_exclude_pitcher() {
        assert!(!Position::BATTING.contains(&Position::Pitcher));
        assert_eq!(Position::BATTING.len() + 1, Position::ALL.len());
    }

    #[test]
    fn headline_uses_role() {
        let mut p = Player::new(1, "Kim Do-yeong", "KIA Tigers", Position::Third);
        p.batting_average = Some(0.347);
        p.home_runs = Some(38.0);
        assert!(p.headline_stats().starts_with("AVG .347 HR 38"));
        assert_eq!(p.short_name(), "Do-yeong");
        assert_eq!(p.number_label(), "#--");

        let mut sp = Player::new(2, "Yang", "KIA Tigers", Position::Pitcher);
        sp.era = Some(2.45);
        assert!(sp.headline_stats().starts_with("ERA 2.45"));
    }
}
