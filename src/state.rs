use std::collections::{HashMap, HashSet, VecDeque};

use chrono::NaiveDate;

use crate::panel::{PanelController, Tab};
use crate::player::{Player, Position};
use crate::roster::RosterSelector;
use crate::team_stats::{TeamReport, build_report};

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameRole {
    Hitter,
    Pitcher,
}

impl GameRole {
    pub fn for_position(position: Position) -> Self {
        if position.is_pitcher() {
            GameRole::Pitcher
        } else {
            GameRole::Hitter
        }
    }
}

/// One line of a player's game log. Columns the backend omits stay `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentGame {
    pub role: GameRole,
    pub date: Option<NaiveDate>,
    pub date_raw: String,
    pub opponent: String,
    pub result: Option<String>,
    pub avg: Option<f64>,
    pub plate_appearances: Option<f64>,
    pub at_bats: Option<f64>,
    pub hits: Option<f64>,
    pub home_runs: Option<f64>,
    pub rbis: Option<f64>,
    pub stolen_bases: Option<f64>,
    pub walks: Option<f64>,
    pub strikeouts: Option<f64>,
    pub era: Option<f64>,
    pub innings: Option<f64>,
    pub earned_runs: Option<f64>,
}

impl RecentGame {
    pub fn date_label(&self) -> String {
        match self.date {
            Some(d) => d.format("%m.%d").to_string(),
            None if self.date_raw.is_empty() => "--.--".to_string(),
            None => self.date_raw.clone(),
        }
    }

    pub fn summary(&self) -> String {
        let n = |v: Option<f64>| v.map(|v| format!("{v:.0}")).unwrap_or_else(|| "-".into());
        match self.role {
            GameRole::Hitter => format!(
                "{}-{} HR {} RBI {} BB {} SO {}",
                n(self.hits),
                n(self.at_bats),
                n(self.home_runs),
                n(self.rbis),
                n(self.walks),
                n(self.strikeouts)
            ),
            GameRole::Pitcher => format!(
                "{} {} IP {} H {} ER {} SO",
                self.result.as_deref().unwrap_or("-"),
                self.innings
                    .map(format_innings)
                    .unwrap_or_else(|| "-".into()),
                n(self.hits),
                n(self.earned_runs),
                n(self.strikeouts)
            ),
        }
    }
}

/// Thirds of an inning back into scorebook notation (`6.1`, `5.2`).
pub fn format_innings(innings: f64) -> String {
    let whole = innings.trunc();
    let outs = ((innings - whole) * 3.0).round() as u32;
    if outs >= 3 {
        format!("{:.0}.0", whole + 1.0)
    } else {
        format!("{whole:.0}.{outs}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtBatOutcome {
    pub batter: String,
    pub pitcher: String,
    pub result: String,
    /// Sorted most likely first.
    pub probabilities: Vec<(String, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOrigin {
    Api,
    Sample,
}

impl CatalogOrigin {
    pub fn label(self) -> &'static str {
        match self {
            CatalogOrigin::Api => "api",
            CatalogOrigin::Sample => "sample",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub catalog: Vec<Player>,
    pub catalog_origin: Option<CatalogOrigin>,
    pub catalog_error: Option<String>,
    pub catalog_loading: bool,
    pub roster: RosterSelector,
    pub panel: PanelController,
    pub logs: VecDeque<String>,
    pub recent_games: HashMap<String, Vec<RecentGame>>,
    pub recent_loading: HashSet<String>,
    pub simulation: Option<AtBatOutcome>,
    pub simulating: bool,
    pub album_cursor: usize,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(panel_extent: f64) -> Self {
        Self {
            catalog: Vec::new(),
            catalog_origin: None,
            catalog_error: None,
            catalog_loading: true,
            roster: RosterSelector::new(),
            panel: PanelController::new(panel_extent),
            logs: VecDeque::with_capacity(MAX_LOGS),
            recent_games: HashMap::new(),
            recent_loading: HashSet::new(),
            simulation: None,
            simulating: false,
            album_cursor: 0,
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn report(&self) -> TeamReport {
        build_report(self.roster.selected())
    }

    pub fn active_tab(&self) -> Option<Tab> {
        self.panel.active_tab()
    }

    pub fn candidates(&self, position: Position) -> impl Iterator<Item = &Player> {
        self.catalog.iter().filter(move |p| p.position == position)
    }

    /// Selected lineup in display order, as shown by the album.
    pub fn album_entries(&self) -> Vec<(Position, &Player)> {
        self.roster
            .selected()
            .iter()
            .map(|(pos, player)| (*pos, player))
            .collect()
    }

    pub fn album_selected(&self) -> Option<(Position, &Player)> {
        self.album_entries().get(self.album_cursor).copied()
    }

    pub fn move_album_cursor(&mut self, delta: isize) {
        let len = self.roster.selected_count();
        if len == 0 {
            self.album_cursor = 0;
            return;
        }
        let next = self.album_cursor as isize + delta;
        self.album_cursor = next.clamp(0, len as isize - 1) as usize;
    }

    /// Batter under the album cursor against the selected pitcher.
    pub fn matchup(&self) -> Option<(String, String)> {
        let (pos, batter) = self.album_selected()?;
        if pos.is_pitcher() {
            return None;
        }
        let pitcher = self.roster.selected_for(Position::Pitcher)?;
        Some((batter.name.clone(), pitcher.name.clone()))
    }

    pub fn recent_games_for(&self, name: &str) -> Option<&[RecentGame]> {
        self.recent_games.get(name).map(|v| v.as_slice())
    }

    fn clamp_album_cursor(&mut self) {
        let len = self.roster.selected_count();
        if self.album_cursor >= len {
            self.album_cursor = len.saturating_sub(1);
        }
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetCatalog {
        players: Vec<Player>,
        origin: CatalogOrigin,
        skipped: usize,
    },
    CatalogFailed(String),
    SetPositionPlayers {
        position: Position,
        players: Vec<Player>,
    },
    UpsertPlayer(Player),
    SetRecentGames {
        name: String,
        games: Vec<RecentGame>,
    },
    RecentGamesFailed {
        name: String,
        error: String,
    },
    SetSimulation(AtBatOutcome),
    SimulationFailed(String),
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    FetchCatalog,
    FetchPosition {
        position: Position,
    },
    FetchPlayerDetail {
        player_id: u32,
    },
    FetchRecentGames {
        player_name: String,
        role: GameRole,
    },
    SimulateAtBat {
        batter: String,
        pitcher: String,
    },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetCatalog {
            players,
            origin,
            skipped,
        } => {
            state.push_log(format!(
                "[INFO] Loaded {} players ({})",
                players.len(),
                origin.label()
            ));
            if skipped > 0 {
                state.push_log(format!("[WARN] Skipped {skipped} unreadable player rows"));
            }
            state.catalog = players;
            state.catalog_origin = Some(origin);
            state.catalog_loading = false;
            // A sample fallback follows an API failure; keep the reason visible.
            if origin == CatalogOrigin::Api {
                state.catalog_error = None;
            }
            let dropped = state.roster.retain_known(&state.catalog);
            if dropped > 0 {
                state.push_log(format!("[INFO] Cleared {dropped} stale selections"));
            }
            state.roster.cursor = 0;
            state.clamp_album_cursor();
        }
        Delta::CatalogFailed(err) => {
            state.push_log(format!("[WARN] Player list unavailable: {err}"));
            state.catalog_error = Some(err);
            state.catalog_loading = false;
        }
        Delta::SetPositionPlayers { position, players } => {
            state.catalog.retain(|p| p.position != position);
            state
                .catalog
                .extend(players.into_iter().filter(|p| p.position == position));
            state.roster.retain_known(&state.catalog);
            state.clamp_album_cursor();
        }
        Delta::UpsertPlayer(player) => {
            if let Some(existing) = state.catalog.iter_mut().find(|p| p.id == player.id) {
                *existing = player.clone();
            } else {
                state.catalog.push(player.clone());
            }
            // Refresh the lineup copy so stats follow the detail fetch.
            let pos = player.position;
            if state.roster.selected_for(pos).map(|p| p.id) == Some(player.id) {
                state.roster.select(pos, player);
            }
        }
        Delta::SetRecentGames { name, games } => {
            state.recent_loading.remove(&name);
            state.push_log(format!("[INFO] {} recent games for {name}", games.len()));
            state.recent_games.insert(name, games);
        }
        Delta::RecentGamesFailed { name, error } => {
            state.recent_loading.remove(&name);
            state.push_log(format!("[WARN] Recent games for {name}: {error}"));
        }
        Delta::SetSimulation(outcome) => {
            state.simulating = false;
            state.push_log(format!(
                "[INFO] {} vs {}: {}",
                outcome.batter, outcome.pitcher, outcome.result
            ));
            state.simulation = Some(outcome);
        }
        Delta::SimulationFailed(err) => {
            state.simulating = false;
            state.push_log(format!("[WARN] Simulation failed: {err}"));
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logs_are_bounded() {
        let mut state = AppState::new(100.0);
        for i in 0..250 {
            state.push_log(format!("[INFO] {i}"));
        }
        assert_eq!(state.logs.len(), MAX_LOGS);
        assert_eq!(state.logs.front().map(String::as_str), Some("[INFO] 50"));
    }

    #[test]
    fn innings_notation_round_trips_thirds() {
        assert_eq!(format_innings(6.0 + 1.0 / 3.0), "6.1");
        assert_eq!(format_innings(5.0 + 2.0 / 3.0), "5.2");
        assert_eq!(format_innings(7.0), "7.0");
    }

    #[test]
    fn matchup_needs_batter_and_pitcher() {
        let mut state = AppState::new(100.0);
        let pitcher = Player::new(1, "Arm", "T", Position::Pitcher);
        let batter = Player::new(2, "Bat", "T", Position::Center);
        state.roster.select(Position::Center, batter);
        assert_eq!(state.matchup(), None);
        state.roster.select(Position::Pitcher, pitcher);
        // Pitcher sorts first in display order.
        assert_eq!(state.matchup(), None);
        state.move_album_cursor(1);
        assert_eq!(
            state.matchup(),
            Some(("Bat".to_string(), "Arm".to_string()))
        );
    }
}
