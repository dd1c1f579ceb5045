use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde_json::{Value, json};

use crate::api_config::{ApiConfig, ApiEndpoints, CatalogSource};
use crate::http_client::http_client;
use crate::player::{Player, Position};
use crate::state::{AtBatOutcome, GameRole, RecentGame};

/// Ids handed to rows that come without one (season lists key players by name).
const SYNTHETIC_ID_BASE: u32 = 1_000_000;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPlayers {
    pub players: Vec<Player>,
    /// Rows dropped for lacking a name or a recognisable position.
    pub skipped: usize,
}

impl ParsedPlayers {
    fn extend(&mut self, other: ParsedPlayers) {
        self.players.extend(other.players);
        self.skipped += other.skipped;
    }
}

pub fn fetch_catalog(cfg: &ApiConfig) -> Result<ParsedPlayers> {
    let ep = cfg.endpoints();
    let client = http_client(ep.timeout_secs())?;
    match cfg.catalog {
        CatalogSource::Players => {
            let body = get_text(client, &ep.players())?;
            parse_players_json(&body, None)
        }
        CatalogSource::ByPosition => {
            let body = get_text(client, &ep.all_players_by_position())?;
            parse_players_json(&body, None)
        }
        CatalogSource::Mysql => {
            let body = get_text(client, &ep.mysql_players())?;
            parse_players_json(&body, None)
        }
        CatalogSource::Season2025 => {
            let hitters = get_text(client, &ep.hitters_2025()).context("hitters 2025")?;
            let pitchers = get_text(client, &ep.pitchers_2025()).context("pitchers 2025")?;
            let mut out = parse_players_json(&hitters, None)?;
            let mut arms = parse_players_json(&pitchers, Some(Position::Pitcher))?;
            // Keep ids unique across the two lists.
            let offset = (out.players.len() + out.skipped) as u32;
            for p in &mut arms.players {
                if p.id >= SYNTHETIC_ID_BASE {
                    p.id += offset;
                }
            }
            out.extend(arms);
            Ok(out)
        }
    }
}

pub fn fetch_players_by_position(ep: &ApiEndpoints, position: Position) -> Result<Vec<Player>> {
    let client = http_client(ep.timeout_secs())?;
    let body = get_text(client, &ep.players_by_position(position))?;
    let parsed = parse_players_json(&body, Some(position))?;
    Ok(parsed
        .players
        .into_iter()
        .filter(|p| p.position == position)
        .collect())
}

pub fn fetch_player_detail(ep: &ApiEndpoints, id: u32) -> Result<Player> {
    let client = http_client(ep.timeout_secs())?;
    let body = get_text(client, &ep.player_detail(id))?;
    parse_player_detail_json(&body)
}

pub fn fetch_recent_games(
    ep: &ApiEndpoints,
    player_name: &str,
    role: GameRole,
    season_year: i32,
) -> Result<Vec<RecentGame>> {
    let client = http_client(ep.timeout_secs())?;
    let url = match role {
        GameRole::Hitter => ep.hitter_recent_games(player_name)?,
        GameRole::Pitcher => ep.pitcher_recent_games(player_name)?,
    };
    let body = get_text(client, &url)?;
    parse_recent_games_json(&body, role, season_year)
}

pub fn simulate_at_bat(ep: &ApiEndpoints, batter: &str, pitcher: &str) -> Result<AtBatOutcome> {
    let client = http_client(ep.timeout_secs())?;
    let body = json!({ "batter_name": batter, "pitcher_name": pitcher });
    let resp = client
        .post(ep.simulate_at_bat())
        .json(&body)
        .send()
        .context("simulate request failed")?;
    let status = resp.status();
    let text = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow!("http {}: {}", status, text));
    }
    parse_simulation_json(&text, batter, pitcher)
}

fn get_text(client: &Client, url: &str) -> Result<String> {
    let resp = client.get(url).send().context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow!("http {}: {}", status, body));
    }
    Ok(body)
}

/// Accepts a bare array, a paginated `{"results": [...]}` page, or an object keyed by
/// position (`all_by_position`). `default_position` fills rows that carry none.
pub fn parse_players_json(raw: &str, default_position: Option<Position>) -> Result<ParsedPlayers> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(ParsedPlayers::default());
    }
    let root: Value = serde_json::from_str(trimmed).context("invalid players json")?;

    let mut out = ParsedPlayers::default();
    match &root {
        Value::Array(rows) => collect_rows(rows, default_position, &mut out),
        Value::Object(map) => {
            let list = ["results", "players", "data"]
                .iter()
                .find_map(|k| map.get(*k).and_then(|v| v.as_array()));
            if let Some(rows) = list {
                collect_rows(rows, default_position, &mut out);
            } else {
                for (key, value) in map {
                    let Some(rows) = value.as_array() else {
                        continue;
                    };
                    let pos = Position::parse(key).or(default_position);
                    collect_rows(rows, pos, &mut out);
                }
            }
        }
        _ => return Err(anyhow!("unexpected players payload")),
    }
    Ok(out)
}

pub fn parse_player_detail_json(raw: &str) -> Result<Player> {
    let root: Value = serde_json::from_str(raw.trim()).context("invalid player json")?;
    parse_player(&root, None, SYNTHETIC_ID_BASE).ok_or_else(|| anyhow!("player row incomplete"))
}

fn collect_rows(rows: &[Value], default_position: Option<Position>, out: &mut ParsedPlayers) {
    for row in rows {
        let synthetic = SYNTHETIC_ID_BASE + out.players.len() as u32 + out.skipped as u32;
        match parse_player(row, default_position, synthetic) {
            Some(player) => out.players.push(player),
            None => out.skipped += 1,
        }
    }
}

fn parse_player(value: &Value, default_position: Option<Position>, synthetic_id: u32) -> Option<Player> {
    let name = pick_string(value, &["name", "player_name", "선수명"])?;
    if name.is_empty() {
        return None;
    }
    let position = pick_string(value, &["position", "pos", "POS", "포지션"])
        .and_then(|p| Position::parse(&p))
        .or(default_position)?;

    Some(Player {
        id: pick_u32(value, &["id", "player_id"]).unwrap_or(synthetic_id),
        name,
        back_number: pick_u32(value, &["back_number", "backNumber", "number", "등번호"]),
        team: pick_string(value, &["team", "team_name", "팀명"]).unwrap_or_default(),
        position,
        batting_average: pick_f64(value, &["batting_average", "batting_avg", "AVG", "avg"]),
        rbis: pick_f64(value, &["rbis", "rbi", "RBI"]),
        home_runs: pick_f64(value, &["home_runs", "hr", "HR"]),
        stolen_bases: pick_f64(value, &["stolen_bases", "sb", "SB"]),
        era: pick_f64(value, &["era", "ERA"]),
        wins: pick_f64(value, &["wins", "W", "w"]),
        losses: pick_f64(value, &["losses", "L", "l"]),
        saves: pick_f64(value, &["saves", "SV", "sv"]),
        holds: pick_f64(value, &["holds", "HLD", "hld"]),
        strikeouts: pick_f64(value, &["strikeouts", "SO", "so"]),
    })
}

/// Game logs come newest-first regardless of the order the backend used.
pub fn parse_recent_games_json(raw: &str, role: GameRole, season_year: i32) -> Result<Vec<RecentGame>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let root: Value = serde_json::from_str(trimmed).context("invalid recent games json")?;
    let rows: &[Value] = match &root {
        Value::Array(rows) => rows.as_slice(),
        Value::Object(map) => ["games", "results", "data"]
            .iter()
            .find_map(|k| map.get(*k).and_then(|v| v.as_array()))
            .map(|v| v.as_slice())
            .unwrap_or(&[]),
        _ => &[],
    };

    let mut games: Vec<RecentGame> = rows
        .iter()
        .map(|row| {
            let date_raw = pick_string(row, &["date", "game_date", "일자"]).unwrap_or_default();
            RecentGame {
                role,
                date: parse_game_date(&date_raw, season_year),
                date_raw,
                opponent: pick_string(row, &["opponent", "opp", "상대"]).unwrap_or_default(),
                result: pick_string(row, &["result", "결과"]).filter(|s| !s.is_empty()),
                avg: pick_f64(row, &["avg", "AVG"]),
                plate_appearances: pick_f64(row, &["pa", "PA"]),
                at_bats: pick_f64(row, &["ab", "AB"]),
                hits: pick_f64(row, &["h", "H"]),
                home_runs: pick_f64(row, &["hr", "HR"]),
                rbis: pick_f64(row, &["rbi", "RBI"]),
                stolen_bases: pick_f64(row, &["sb", "SB"]),
                walks: pick_f64(row, &["bb", "BB"]),
                strikeouts: pick_f64(row, &["so", "SO"]),
                era: pick_f64(row, &["era", "ERA"]),
                innings: pick_innings(row, &["ip", "IP"]),
                earned_runs: pick_f64(row, &["er", "ER"]),
            }
        })
        .collect();

    games.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(games)
}

pub fn parse_simulation_json(raw: &str, batter: &str, pitcher: &str) -> Result<AtBatOutcome> {
    let root: Value = serde_json::from_str(raw.trim()).context("invalid simulation json")?;
    let mut probabilities: Vec<(String, f64)> = ["probabilities", "probs", "distribution"]
        .iter()
        .find_map(|k| root.get(*k).and_then(|v| v.as_object()))
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| value_to_f64(v).map(|p| (k.clone(), p)))
                .collect()
        })
        .unwrap_or_default();
    probabilities.sort_by(|a, b| b.1.total_cmp(&a.1));

    let result = pick_string(&root, &["result", "outcome", "prediction"])
        .filter(|s| !s.is_empty())
        .or_else(|| probabilities.first().map(|(k, _)| k.clone()))
        .ok_or_else(|| anyhow!("simulation response has no result"))?;

    Ok(AtBatOutcome {
        batter: batter.to_string(),
        pitcher: pitcher.to_string(),
        result,
        probabilities,
    })
}

/// `YYYY-MM-DD`, `YYYY.MM.DD`, `YYYY/MM/DD`, or `MM.DD` / `MM-DD` within `season_year`.
pub fn parse_game_date(raw: &str, season_year: i32) -> Option<NaiveDate> {
    const FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d"];
    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return None;
    }
    for fmt in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(cleaned, fmt) {
            return Some(date);
        }
    }
    let mut parts = cleaned.split(['.', '/', '-']);
    let month = parts.next()?.trim().parse::<u32>().ok()?;
    let day = parts.next()?.trim().parse::<u32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(season_year, month, day)
}

fn pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        match value.get(*key) {
            Some(Value::String(s)) => return Some(s.trim().to_string()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

fn pick_u32(value: &Value, keys: &[&str]) -> Option<u32> {
    for key in keys {
        if let Some(v) = value.get(*key) {
            if let Some(num) = v.as_u64() {
                return u32::try_from(num).ok();
            }
            if let Some(s) = v.as_str()
                && let Ok(num) = s.trim().parse::<u32>()
            {
                return Some(num);
            }
        }
    }
    None
}

fn pick_f64(value: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .find_map(|key| value.get(*key).and_then(value_to_f64))
}

/// Innings come as `6.1` or `6 1/3`; both mean six and a third.
fn pick_innings(value: &Value, keys: &[&str]) -> Option<f64> {
    for key in keys {
        let Some(v) = value.get(*key) else {
            continue;
        };
        if let Some(s) = v.as_str() {
            let s = s.trim();
            if let Some(thirds) = innings_thirds(s) {
                return Some(thirds / 3.0);
            }
            if let Some((whole, frac)) = s.split_once(' ') {
                let whole = whole.parse::<f64>().ok()?;
                let thirds = innings_thirds(frac.trim()).unwrap_or(0.0);
                return Some(whole + thirds / 3.0);
            }
            if let Some(n) = parse_stat_cell(s) {
                return Some(baseball_innings(n));
            }
        } else if let Some(n) = v.as_f64() {
            return Some(baseball_innings(n));
        }
    }
    None
}

/// Outs in a partial inning written as `1/3` or `2/3`.
fn innings_thirds(frac: &str) -> Option<f64> {
    match frac {
        "1/3" => Some(1.0),
        "2/3" => Some(2.0),
        _ => None,
    }
}

fn baseball_innings(n: f64) -> f64 {
    let whole = n.trunc();
    let outs = ((n - whole) * 10.0).round();
    whole + outs / 3.0
}

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_stat_cell(s),
        _ => None,
    }
}

fn parse_stat_cell(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().trim_end_matches('%');
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_stat_cell_handles_strings() {
        assert_eq!(parse_stat_cell("0.347"), Some(0.347));
        assert_eq!(parse_stat_cell(" 12 "), Some(12.0));
        assert_eq!(parse_stat_cell("58%"), Some(58.0));
        assert_eq!(parse_stat_cell("-"), None);
        assert_eq!(parse_stat_cell("NaN"), None);
    }

    #[test]
    fn innings_notation() {
        let v: Value = serde_json::json!({ "IP": "6.1" });
        assert!((pick_innings(&v, &["IP"]).unwrap() - (6.0 + 1.0 / 3.0)).abs() < 1e-9);
        let v: Value = serde_json::json!({ "IP": "5 2/3" });
        assert!((pick_innings(&v, &["IP"]).unwrap() - (5.0 + 2.0 / 3.0)).abs() < 1e-9);
        let v: Value = serde_json::json!({ "IP": 7 });
        assert_eq!(pick_innings(&v, &["IP"]), Some(7.0));
    }

    #[test]
    fn partial_inning_without_whole_part() {
        let v: Value = serde_json::json!({ "IP": "1/3" });
        assert!((pick_innings(&v, &["IP"]).unwrap() - 1.0 / 3.0).abs() < 1e-9);
        let v: Value = serde_json::json!({ "IP": " 2/3 " });
        assert!((pick_innings(&v, &["IP"]).unwrap() - 2.0 / 3.0).abs() < 1e-9);
        let v: Value = serde_json::json!({ "IP": "3/4" });
        assert_eq!(pick_innings(&v, &["IP"]), None);
    }

    #[test]
    fn game_dates() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day);
        assert_eq!(parse_game_date("2025-04-12", 2024), d(2025, 4, 12));
        assert_eq!(parse_game_date("2025.09.30", 2024), d(2025, 9, 30));
        assert_eq!(parse_game_date("04.12", 2025), d(2025, 4, 12));
        assert_eq!(parse_game_date("13.40", 2025), None);
        assert_eq!(parse_game_date("", 2025), None);
    }

    #[test]
    fn row_without_position_needs_default() {
        let raw = r#"[{"선수명": "Kim", "AVG": "0.301", "HR": "9"}]"#;
        let none = parse_players_json(raw, None).unwrap();
        assert_eq!(none.players.len(), 0);
        assert_eq!(none.skipped, 1);

        let with = parse_players_json(raw, Some(Position::Left)).unwrap();
        assert_eq!(with.players.len(), 1);
        let p = &with.players[0];
        assert_eq!(p.position, Position::Left);
        assert_eq!(p.batting_average, Some(0.301));
        assert_eq!(p.home_runs, Some(9.0));
        assert_eq!(p.id, SYNTHETIC_ID_BASE);
    }

    #[test]
    fn simulation_falls_back_to_most_likely() {
        let raw = r#"{"probabilities": {"out": 0.62, "single": 0.2, "home_run": "0.04"}}"#;
        let outcome = parse_simulation_json(raw, "B", "P").unwrap();
        assert_eq!(outcome.result, "out");
        assert_eq!(outcome.probabilities.len(), 3);
        assert_eq!(outcome.probabilities[2].0, "home_run");
        assert!(parse_simulation_json("{}", "B", "P").is_err());
    }
}
