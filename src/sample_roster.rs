use anyhow::{Context, Result};

use crate::player::{Player, Position};

/// 2024 KBO players bundled for offline demos and as the fallback when the API is down.
pub fn sample_players() -> Result<Vec<Player>> {
    let raw = include_str!("../assets/sample_players.json");
    serde_json::from_str::<Vec<Player>>(raw).context("invalid bundled sample roster")
}

/// First listed player at every position, a full lineup for headless runs.
pub fn auto_lineup(catalog: &[Player]) -> Vec<(Position, Player)> {
    Position::ALL
        .iter()
        .filter_map(|pos| {
            catalog
                .iter()
                .find(|p| p.position == *pos)
                .map(|p| (*pos, p.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_roster_covers_every_position() {
        let players = sample_players().unwrap();
        assert_eq!(players.len(), 45);
        for pos in Position::ALL {
            assert_eq!(players.iter().filter(|p| p.position == pos).count(), 5, "{pos:?}");
        }
        let mut ids: Vec<u32> = players.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), players.len());
    }

    #[test]
    fn auto_lineup_fills_nine() {
        let players = sample_players().unwrap();
        let lineup = auto_lineup(&players);
        assert_eq!(lineup.len(), 9);
        assert_eq!(lineup[0].0, Position::Pitcher);
        assert_eq!(lineup[0].1.name, "양현종");
    }
}
