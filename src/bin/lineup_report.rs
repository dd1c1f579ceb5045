use std::collections::BTreeMap;

use anyhow::{Context, Result, anyhow};
use serde::Serialize;

use lineup_terminal::api_config::ApiConfig;
use lineup_terminal::player::{Player, Position};
use lineup_terminal::player_fetch;
use lineup_terminal::radar::{Point, RadarChart, path_data};
use lineup_terminal::sample_roster::{auto_lineup, sample_players};
use lineup_terminal::team_stats::{EMPTY_STATS_MESSAGE, TeamAbilities, TeamReport, build_report};

#[derive(Serialize)]
struct LineupEntry<'a> {
    position: Position,
    player: &'a Player,
}

#[derive(Serialize)]
struct ReportOut<'a> {
    source: &'static str,
    lineup: Vec<LineupEntry<'a>>,
    report: TeamReport,
    radar_vertices: [Point; 5],
    radar_path: String,
}

/// Headless team report: `lineup_report [--sample] [--json] [--lineup P=54,SS=7,...]`.
/// Lineup values are back numbers or names; without `--lineup` the first player at each
/// position is used.
fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut cfg = ApiConfig::from_env();
    if args.iter().any(|a| a == "--sample") {
        cfg.use_sample = true;
    }
    let as_json = args.iter().any(|a| a == "--json");

    let (source, catalog) = load_catalog(&cfg)?;

    let selected: BTreeMap<Position, Player> = match parse_lineup_arg(&args) {
        Some(spec) => pick_lineup(&catalog, &spec)?,
        None => auto_lineup(&catalog).into_iter().collect(),
    };

    let report = build_report(&selected);
    let chart = RadarChart::default();
    let vertices = chart.vertices(&report.abilities);

    if as_json {
        let out = ReportOut {
            source,
            lineup: selected
                .iter()
                .map(|(position, player)| LineupEntry {
                    position: *position,
                    player,
                })
                .collect(),
            radar_path: path_data(&chart, &vertices),
            radar_vertices: vertices,
            report,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&out).context("serialize report")?
        );
        return Ok(());
    }

    println!("Source: {source} ({} players)", catalog.len());
    print_text(&selected, &report, &chart, &vertices);
    Ok(())
}

fn load_catalog(cfg: &ApiConfig) -> Result<(&'static str, Vec<Player>)> {
    if cfg.use_sample {
        return Ok(("sample", sample_players()?));
    }
    match player_fetch::fetch_catalog(cfg) {
        Ok(parsed) if !parsed.players.is_empty() => {
            if parsed.skipped > 0 {
                eprintln!("[WARN] Skipped {} unreadable player rows", parsed.skipped);
            }
            Ok(("api", parsed.players))
        }
        Ok(_) if cfg.sample_fallback => {
            eprintln!("[WARN] Backend returned no players; using the sample roster");
            Ok(("sample", sample_players()?))
        }
        Err(err) if cfg.sample_fallback => {
            eprintln!("[WARN] Player list unavailable: {err:#}; using the sample roster");
            Ok(("sample", sample_players()?))
        }
        Ok(_) => Err(anyhow!("backend returned no players")),
        Err(err) => Err(err.context("player list unavailable")),
    }
}

fn parse_lineup_arg(args: &[String]) -> Option<String> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(v) = arg.strip_prefix("--lineup=")
            && !v.trim().is_empty()
        {
            return Some(v.to_string());
        }
        if arg == "--lineup"
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.clone());
        }
    }
    None
}

/// `P=54,SS=김하성` style picks. Later picks for a position replace earlier ones.
fn pick_lineup(catalog: &[Player], spec: &str) -> Result<BTreeMap<Position, Player>> {
    let mut selected = BTreeMap::new();
    for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (pos_raw, who) = part
            .split_once('=')
            .with_context(|| format!("expected POSITION=PLAYER, got {part:?}"))?;
        let position = Position::parse(pos_raw)
            .with_context(|| format!("unknown position {pos_raw:?}"))?;
        let who = who.trim();
        let number = who.trim_start_matches('#').parse::<u32>().ok();
        let player = catalog
            .iter()
            .filter(|p| p.position == position)
            .find(|p| match number {
                Some(n) => p.back_number == Some(n),
                None => p.name == who,
            })
            .with_context(|| format!("no {} matching {who:?}", position.label()))?;
        selected.insert(position, player.clone());
    }
    Ok(selected)
}

fn print_text(
    selected: &BTreeMap<Position, Player>,
    report: &TeamReport,
    chart: &RadarChart,
    vertices: &[Point; 5],
) {
    println!("Lineup:");
    for (pos, player) in selected {
        println!(
            "  {:<3}{:<5}{} ({})  {}",
            pos.abbr(),
            player.number_label(),
            player.name,
            player.team,
            player.headline_stats()
        );
    }
    println!();

    if !report.stats.has_data() {
        println!("{EMPTY_STATS_MESSAGE}");
        return;
    }

    let s = &report.stats;
    println!(
        "Batting ({} players): AVG {:.3}  RBI {:.1}  HR {:.1}  SB {:.1}",
        s.batter_count, s.batting_avg, s.rbis, s.home_runs, s.stolen_bases
    );
    if s.has_pitcher() {
        println!(
            "Pitching: ERA {:.2}  W {:.1}  L {:.1}  SV {:.1}  HLD {:.1}  SO {:.1}",
            s.era, s.wins, s.losses, s.saves, s.holds, s.strikeouts
        );
    }
    println!();

    println!("Abilities:");
    for ((label, value), vertex) in TeamAbilities::LABELS
        .iter()
        .zip(report.abilities.as_array())
        .zip(vertices)
    {
        println!(
            "  {label:<9}{value:>3}  vertex ({:>6.1}, {:>6.1})",
            vertex.x, vertex.y
        );
    }
    println!("Radar path: {}", path_data(chart, vertices));
    println!();
    println!("Team color: {}", report.traits);
    println!(
        "Expected win rate: {:.1}% ({})",
        report.win_rate * 100.0,
        report.message
    );
}
