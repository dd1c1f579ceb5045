use std::collections::BTreeMap;

use serde::Serialize;

use crate::player::{Player, Position};

const POWER_HR_SCALE: f64 = 60.0;
const ACCURACY_AVG_SCALE: f64 = 0.400;
const RUNNING_SB_SCALE: f64 = 50.0;
const ERA_CEILING: f64 = 6.0;
const NEUTRAL_PITCHING: f64 = 50.0;

const WIN_RATE_BASE: f64 = 0.4;
const WIN_RATE_SPAN: f64 = 0.2;
const WIN_RATE_MIN: f64 = 0.3;
const WIN_RATE_MAX: f64 = 0.7;

const TRAIT_THRESHOLD: u8 = 70;

pub const EMPTY_STATS_MESSAGE: &str = "Select players to see team stats.";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TeamStats {
    pub batting_avg: f64,
    pub rbis: f64,
    pub home_runs: f64,
    pub stolen_bases: f64,

    pub era: f64,
    pub wins: f64,
    pub losses: f64,
    pub saves: f64,
    pub holds: f64,
    pub strikeouts: f64,

    pub batter_count: usize,
    pub pitcher_count: usize,
}

impl TeamStats {
    pub fn has_data(&self) -> bool {
        self.batter_count > 0 || self.pitcher_count > 0
    }

    pub fn has_pitcher(&self) -> bool {
        self.pitcher_count > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TeamAbilities {
    pub power: u8,
    pub accuracy: u8,
    pub running: u8,
    pub defense: u8,
    pub pitching: u8,
}

impl TeamAbilities {
    pub const LABELS: [&'static str; 5] = ["Power", "Accuracy", "Running", "Defense", "Pitching"];

    /// Values in chart order: power, accuracy, running, defense, pitching.
    pub fn as_array(&self) -> [u8; 5] {
        [
            self.power,
            self.accuracy,
            self.running,
            self.defense,
            self.pitching,
        ]
    }
}

/// Everything the stats view needs, derived from one selection snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamReport {
    pub stats: TeamStats,
    pub abilities: TeamAbilities,
    pub win_rate: f64,
    pub traits: String,
    pub message: &'static str,
}

pub fn build_report(selected: &BTreeMap<Position, Player>) -> TeamReport {
    let stats = compute_team_stats(selected);
    let abilities = compute_abilities(&stats);
    let win_rate = expected_win_rate(&abilities);
    TeamReport {
        stats,
        abilities,
        win_rate,
        traits: team_traits(&abilities),
        message: win_rate_message(win_rate),
    }
}

pub fn compute_team_stats(selected: &BTreeMap<Position, Player>) -> TeamStats {
    let batters: Vec<&Player> = Position::BATTING
        .iter()
        .filter_map(|pos| selected.get(pos))
        .collect();
    let pitchers: Vec<&Player> = selected.get(&Position::Pitcher).into_iter().collect();

    let mut stats = TeamStats {
        batter_count: batters.len(),
        pitcher_count: pitchers.len(),
        ..TeamStats::default()
    };

    if !batters.is_empty() {
        stats.batting_avg = mean(&batters, |p| p.batting_average);
        stats.rbis = mean(&batters, |p| p.rbis);
        stats.home_runs = mean(&batters, |p| p.home_runs);
        stats.stolen_bases = mean(&batters, |p| p.stolen_bases);
    }

    if !pitchers.is_empty() {
        stats.era = mean(&pitchers, |p| p.era);
        stats.wins = mean(&pitchers, |p| p.wins);
        stats.losses = mean(&pitchers, |p| p.losses);
        stats.saves = mean(&pitchers, |p| p.saves);
        stats.holds = mean(&pitchers, |p| p.holds);
        stats.strikeouts = mean(&pitchers, |p| p.strikeouts);
    }

    stats
}

pub fn compute_abilities(stats: &TeamStats) -> TeamAbilities {
    let power = clamp_ability(finite(stats.home_runs) / POWER_HR_SCALE * 100.0);
    let accuracy = clamp_ability(finite(stats.batting_avg) / ACCURACY_AVG_SCALE * 100.0);
    let running = clamp_ability(finite(stats.stolen_bases) / RUNNING_SB_SCALE * 100.0);
    // Derived from the unrounded batting scores.
    let defense = clamp_ability(accuracy * 0.6 + power * 0.4);
    let era = finite(stats.era);
    let pitching = if era > 0.0 {
        clamp_ability((ERA_CEILING - era) / ERA_CEILING * 100.0)
    } else {
        NEUTRAL_PITCHING
    };

    TeamAbilities {
        power: round_ability(power),
        accuracy: round_ability(accuracy),
        running: round_ability(running),
        defense: round_ability(defense),
        pitching: round_ability(pitching),
    }
}

pub fn expected_win_rate(abilities: &TeamAbilities) -> f64 {
    let offense =
        (abilities.power as f64 + abilities.accuracy as f64 + abilities.running as f64) / 3.0;
    let defense = (abilities.defense as f64 + abilities.pitching as f64) / 2.0;
    let total = (offense * 0.5 + defense * 0.5) / 100.0;
    clamp(WIN_RATE_BASE + total * WIN_RATE_SPAN, WIN_RATE_MIN, WIN_RATE_MAX)
}

pub fn team_traits(abilities: &TeamAbilities) -> String {
    let mut traits = Vec::new();
    if abilities.power >= TRAIT_THRESHOLD {
        traits.push("Slugger");
    }
    if abilities.running >= TRAIT_THRESHOLD {
        traits.push("Speed");
    }
    if abilities.accuracy >= TRAIT_THRESHOLD && abilities.power >= 60 {
        traits.push("Contact");
    }
    if abilities.pitching >= TRAIT_THRESHOLD {
        traits.push("Pitching");
    }
    if abilities.defense >= TRAIT_THRESHOLD {
        traits.push("Defense");
    }

    if traits.is_empty() {
        return "Balanced".to_string();
    }
    traits.join("·")
}

pub fn win_rate_message(win_rate: f64) -> &'static str {
    if win_rate >= 0.600 {
        "Championship pace!"
    } else if win_rate >= 0.500 {
        "Playoff contender."
    } else if win_rate >= 0.400 {
        "A fight for the middle of the table."
    } else {
        "Time to rebuild..."
    }
}

fn mean(players: &[&Player], field: impl Fn(&Player) -> Option<f64>) -> f64 {
    if players.is_empty() {
        return 0.0;
    }
    let total: f64 = players.iter().map(|p| finite(field(p).unwrap_or(0.0))).sum();
    total / players.len() as f64
}

fn finite(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

fn clamp_ability(v: f64) -> f64 {
    clamp(finite(v), 0.0, 100.0)
}

fn round_ability(v: f64) -> u8 {
    clamp_ability(v).round() as u8
}

fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}
