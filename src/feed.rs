use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::api_config::ApiConfig;
use crate::player_fetch;
use crate::sample_roster::sample_players;
use crate::state::{CatalogOrigin, Delta, ProviderCommand};

/// Background worker that owns every network call. Exits when the UI drops its sender.
pub fn spawn_provider(
    cfg: ApiConfig,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let _ = tx.send(Delta::Log(format!(
            "[INFO] Player source: {}",
            if cfg.use_sample {
                "bundled sample".to_string()
            } else {
                cfg.base_url.clone()
            }
        )));
        load_catalog(&cfg, &tx);

        while let Ok(cmd) = cmd_rx.recv() {
            handle_command(&cfg, cmd, &tx);
        }
    })
}

fn handle_command(cfg: &ApiConfig, cmd: ProviderCommand, tx: &Sender<Delta>) {
    let ep = cfg.endpoints();
    match cmd {
        ProviderCommand::FetchCatalog => load_catalog(cfg, tx),
        ProviderCommand::FetchPosition { position } => {
            if cfg.use_sample {
                return;
            }
            match player_fetch::fetch_players_by_position(&ep, position) {
                Ok(players) => {
                    let _ = tx.send(Delta::SetPositionPlayers { position, players });
                }
                Err(err) => {
                    let _ = tx.send(Delta::Log(format!(
                        "[WARN] {} list error: {err}",
                        position.label()
                    )));
                }
            }
        }
        ProviderCommand::FetchPlayerDetail { player_id } => {
            if cfg.use_sample {
                return;
            }
            match player_fetch::fetch_player_detail(&ep, player_id) {
                Ok(player) => {
                    let _ = tx.send(Delta::UpsertPlayer(player));
                }
                Err(err) => {
                    let _ = tx.send(Delta::Log(format!(
                        "[WARN] Player {player_id} detail error: {err}"
                    )));
                }
            }
        }
        ProviderCommand::FetchRecentGames { player_name, role } => {
            let delta = match player_fetch::fetch_recent_games(&ep, &player_name, role, cfg.season)
            {
                Ok(games) => Delta::SetRecentGames {
                    name: player_name,
                    games,
                },
                Err(err) => Delta::RecentGamesFailed {
                    name: player_name,
                    error: format!("{err:#}"),
                },
            };
            let _ = tx.send(delta);
        }
        ProviderCommand::SimulateAtBat { batter, pitcher } => {
            let delta = match player_fetch::simulate_at_bat(&ep, &batter, &pitcher) {
                Ok(outcome) => Delta::SetSimulation(outcome),
                Err(err) => Delta::SimulationFailed(format!("{err:#}")),
            };
            let _ = tx.send(delta);
        }
    }
}

fn load_catalog(cfg: &ApiConfig, tx: &Sender<Delta>) {
    if cfg.use_sample {
        send_sample(tx);
        return;
    }
    match player_fetch::fetch_catalog(cfg) {
        Ok(parsed) if !parsed.players.is_empty() => {
            let _ = tx.send(Delta::SetCatalog {
                players: parsed.players,
                origin: CatalogOrigin::Api,
                skipped: parsed.skipped,
            });
        }
        Ok(parsed) => {
            let msg = format!("backend returned no players ({} rows skipped)", parsed.skipped);
            let _ = tx.send(Delta::CatalogFailed(msg));
            if cfg.sample_fallback {
                send_sample(tx);
            }
        }
        Err(err) => {
            let _ = tx.send(Delta::CatalogFailed(format!("{err:#}")));
            if cfg.sample_fallback {
                send_sample(tx);
            }
        }
    }
}

fn send_sample(tx: &Sender<Delta>) {
    match sample_players() {
        Ok(players) => {
            let _ = tx.send(Delta::SetCatalog {
                players,
                origin: CatalogOrigin::Sample,
                skipped: 0,
            });
        }
        Err(err) => {
            let _ = tx.send(Delta::CatalogFailed(format!("{err:#}")));
        }
    }
}
