use lineup_terminal::player::{Player, Position};
use lineup_terminal::state::{
    AppState, AtBatOutcome, CatalogOrigin, Delta, GameRole, RecentGame, apply_delta,
};

fn player(id: u32, name: &str, position: Position) -> Player {
    Player::new(id, name, "KIA 타이거즈", position)
}

fn catalog() -> Vec<Player> {
    vec![
        player(1, "양현종", Position::Pitcher),
        player(16, "김도영", Position::Third),
        player(36, "이용규", Position::Center),
    ]
}

fn game(day: &str) -> RecentGame {
    RecentGame {
        role: GameRole::Hitter,
        date: None,
        date_raw: day.to_string(),
        opponent: "LG".to_string(),
        result: None,
        avg: None,
        plate_appearances: None,
        at_bats: Some(4.0),
        hits: Some(2.0),
        home_runs: None,
        rbis: None,
        stolen_bases: None,
        walks: None,
        strikeouts: None,
        era: None,
        innings: None,
        earned_runs: None,
    }
}

#[test]
fn catalog_load_clears_loading_and_logs() {
    let mut state = AppState::new(320.0);
    assert!(state.catalog_loading);
    apply_delta(
        &mut state,
        Delta::SetCatalog {
            players: catalog(),
            origin: CatalogOrigin::Api,
            skipped: 2,
        },
    );
    assert!(!state.catalog_loading);
    assert_eq!(state.catalog.len(), 3);
    assert_eq!(state.catalog_origin, Some(CatalogOrigin::Api));
    assert!(state.logs.iter().any(|l| l.starts_with("[INFO] Loaded 3 players")));
    assert!(state.logs.iter().any(|l| l.starts_with("[WARN] Skipped 2")));
}

#[test]
fn failure_then_sample_keeps_error_visible() {
    let mut state = AppState::new(320.0);
    apply_delta(&mut state, Delta::CatalogFailed("http 502".to_string()));
    assert_eq!(state.catalog_error.as_deref(), Some("http 502"));
    assert!(!state.catalog_loading);

    apply_delta(
        &mut state,
        Delta::SetCatalog {
            players: catalog(),
            origin: CatalogOrigin::Sample,
            skipped: 0,
        },
    );
    assert_eq!(state.catalog_error.as_deref(), Some("http 502"));
    assert_eq!(state.catalog_origin, Some(CatalogOrigin::Sample));

    apply_delta(
        &mut state,
        Delta::SetCatalog {
            players: catalog(),
            origin: CatalogOrigin::Api,
            skipped: 0,
        },
    );
    assert_eq!(state.catalog_error, None);
}

#[test]
fn reload_drops_selections_missing_from_catalog() {
    let mut state = AppState::new(320.0);
    state.roster.select(Position::Pitcher, player(1, "양현종", Position::Pitcher));
    state.roster.select(Position::Left, player(500, "Gone", Position::Left));
    state.album_cursor = 1;
    apply_delta(
        &mut state,
        Delta::SetCatalog {
            players: catalog(),
            origin: CatalogOrigin::Api,
            skipped: 0,
        },
    );
    assert_eq!(state.roster.selected_count(), 1);
    assert_eq!(state.album_cursor, 0);
}

#[test]
fn upsert_refreshes_selected_copy() {
    let mut state = AppState::new(320.0);
    state.catalog = catalog();
    state.roster.select(Position::Third, state.catalog[1].clone());
    assert_eq!(state.report().stats.batting_avg, 0.0);

    let mut detailed = player(16, "김도영", Position::Third);
    detailed.batting_average = Some(0.347);
    apply_delta(&mut state, Delta::UpsertPlayer(detailed));

    assert_eq!(state.catalog[1].batting_average, Some(0.347));
    assert_eq!(
        state
            .roster
            .selected_for(Position::Third)
            .and_then(|p| p.batting_average),
        Some(0.347)
    );
    assert!((state.report().stats.batting_avg - 0.347).abs() < 1e-12);
}

#[test]
fn position_refresh_replaces_only_that_position() {
    let mut state = AppState::new(320.0);
    state.catalog = catalog();
    apply_delta(
        &mut state,
        Delta::SetPositionPlayers {
            position: Position::Pitcher,
            players: vec![
                player(3, "임찬규", Position::Pitcher),
                player(4, "원태인", Position::Pitcher),
                player(99, "Stray", Position::Catcher),
            ],
        },
    );
    assert_eq!(state.candidates(Position::Pitcher).count(), 2);
    assert_eq!(state.candidates(Position::Third).count(), 1);
    assert_eq!(state.candidates(Position::Catcher).count(), 0);
}

#[test]
fn recent_games_and_simulation_round_trip_through_deltas() {
    let mut state = AppState::new(320.0);
    state.recent_loading.insert("김도영".to_string());
    apply_delta(
        &mut state,
        Delta::SetRecentGames {
            name: "김도영".to_string(),
            games: vec![game("09.28"), game("09.25")],
        },
    );
    assert!(state.recent_loading.is_empty());
    assert_eq!(state.recent_games_for("김도영").map(|g| g.len()), Some(2));

    state.recent_loading.insert("이용규".to_string());
    apply_delta(
        &mut state,
        Delta::RecentGamesFailed {
            name: "이용규".to_string(),
            error: "timeout".to_string(),
        },
    );
    assert!(state.recent_loading.is_empty());
    assert!(state.recent_games_for("이용규").is_none());

    state.simulating = true;
    apply_delta(
        &mut state,
        Delta::SetSimulation(AtBatOutcome {
            batter: "김도영".to_string(),
            pitcher: "양현종".to_string(),
            result: "double".to_string(),
            probabilities: Vec::new(),
        }),
    );
    assert!(!state.simulating);
    assert_eq!(
        state.simulation.as_ref().map(|s| s.result.as_str()),
        Some("double")
    );

    state.simulating = true;
    apply_delta(&mut state, Delta::SimulationFailed("http 500".to_string()));
    assert!(!state.simulating);
    assert!(
        state
            .logs
            .back()
            .is_some_and(|l| l.starts_with("[WARN] Simulation failed"))
    );
}
