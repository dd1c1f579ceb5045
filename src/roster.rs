use std::collections::BTreeMap;

use crate::player::{Player, Position};

/// A visible line of the roster panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterRow {
    Header(Position),
    /// Index into the catalog slice passed to [`RosterSelector::rows`].
    Candidate(Position, usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RosterAction {
    Expanded(Position),
    Collapsed(Position),
    Selected(Position, Player),
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct RosterSelector {
    expanded: Option<Position>,
    selected: BTreeMap<Position, Player>,
    pub cursor: usize,
}

impl RosterSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expanded(&self) -> Option<Position> {
        self.expanded
    }

    pub fn selected(&self) -> &BTreeMap<Position, Player> {
        &self.selected
    }

    pub fn selected_for(&self, position: Position) -> Option<&Player> {
        self.selected.get(&position)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Expand `position`, or collapse it if it is already expanded.
    pub fn toggle(&mut self, position: Position) -> RosterAction {
        if self.expanded == Some(position) {
            self.expanded = None;
            RosterAction::Collapsed(position)
        } else {
            self.expanded = Some(position);
            RosterAction::Expanded(position)
        }
    }

    /// Close the expanded list, leaving the cursor on its header.
    pub fn collapse(&mut self, catalog: &[Player]) -> Option<Position> {
        let position = self.expanded.take()?;
        self.cursor_to_header(Some(position), catalog);
        Some(position)
    }

    /// Assign `player` to `position` and collapse the list.
    pub fn select(&mut self, position: Position, player: Player) {
        self.selected.insert(position, player);
        self.expanded = None;
    }

    pub fn clear(&mut self, position: Position) -> Option<Player> {
        self.selected.remove(&position)
    }

    pub fn clear_all(&mut self) {
        self.selected.clear();
        self.expanded = None;
        self.cursor = 0;
    }

    /// Drop selections whose player is no longer in the catalog.
    pub fn retain_known(&mut self, catalog: &[Player]) -> usize {
        let before = self.selected.len();
        self.selected
            .retain(|_, p| catalog.iter().any(|c| c.id == p.id));
        before - self.selected.len()
    }

    /// Headers in position order, with the expanded position's candidates under it.
    pub fn rows(&self, catalog: &[Player]) -> Vec<RosterRow> {
        let mut rows = Vec::with_capacity(Position::ALL.len());
        for pos in Position::ALL {
            rows.push(RosterRow::Header(pos));
            if self.expanded == Some(pos) {
                rows.extend(
                    catalog
                        .iter()
                        .enumerate()
                        .filter(|(_, p)| p.position == pos)
                        .map(|(idx, _)| RosterRow::Candidate(pos, idx)),
                );
            }
        }
        rows
    }

    pub fn move_cursor(&mut self, delta: isize, catalog: &[Player]) {
        let len = self.rows(catalog).len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let next = self.cursor as isize + delta;
        self.cursor = next.clamp(0, len as isize - 1) as usize;
    }

    pub fn current_row(&self, catalog: &[Player]) -> Option<RosterRow> {
        self.rows(catalog).get(self.cursor).copied()
    }

    /// Act on the row under the cursor: toggle a header or pick a candidate.
    pub fn activate(&mut self, catalog: &[Player]) -> RosterAction {
        let Some(row) = self.current_row(catalog) else {
            return RosterAction::Ignored;
        };
        let action = match row {
            RosterRow::Header(pos) => self.toggle(pos),
            RosterRow::Candidate(pos, idx) => match catalog.get(idx) {
                Some(player) => {
                    self.select(pos, player.clone());
                    RosterAction::Selected(pos, player.clone())
                }
                None => RosterAction::Ignored,
            },
        };
        self.cursor_to_header(action_position(&action), catalog);
        action
    }

    pub fn cursor_to_header(&mut self, position: Option<Position>, catalog: &[Player]) {
        let Some(position) = position else {
            return;
        };
        if let Some(idx) = self
            .rows(catalog)
            .iter()
            .position(|r| *r == RosterRow::Header(position))
        {
            self.cursor = idx;
        }
    }
}

fn action_position(action: &RosterAction) -> Option<Position> {
    match action {
        RosterAction::Expanded(p) | RosterAction::Collapsed(p) | RosterAction::Selected(p, _) => {
            Some(*p)
        }
        RosterAction::Ignored => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Player> {
        vec![
            Player::new(1, "A", "T", Position::Pitcher),
            Player::new(2, "B", "T", Position::Catcher),
            Player::new(3, "C", "T", Position::Pitcher),
        ]
    }

    #[test]
    fn only_one_position_expanded() {
        let mut roster = RosterSelector::new();
        roster.toggle(Position::Pitcher);
        roster.toggle(Position::Catcher);
        assert_eq!(roster.expanded(), Some(Position::Catcher));
        roster.toggle(Position::Catcher);
        assert_eq!(roster.expanded(), None);
    }

    #[test]
    fn rows_list_candidates_under_expanded_header() {
        let cat = catalog();
        let mut roster = RosterSelector::new();
        assert_eq!(roster.rows(&cat).len(), 9);
        roster.toggle(Position::Pitcher);
        let rows = roster.rows(&cat);
        assert_eq!(rows.len(), 11);
        assert_eq!(rows[1], RosterRow::Candidate(Position::Pitcher, 0));
        assert_eq!(rows[2], RosterRow::Candidate(Position::Pitcher, 2));
        assert_eq!(rows[3], RosterRow::Header(Position::Catcher));
    }

    #[test]
    fn activate_selects_and_collapses() {
        let cat = catalog();
        let mut roster = RosterSelector::new();
        assert_eq!(roster.activate(&cat), RosterAction::Expanded(Position::Pitcher));
        roster.move_cursor(2, &cat);
        match roster.activate(&cat) {
            RosterAction::Selected(pos, p) => {
                assert_eq!(pos, Position::Pitcher);
                assert_eq!(p.id, 3);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(roster.expanded(), None);
        assert_eq!(roster.cursor, 0);
        assert_eq!(roster.selected_for(Position::Pitcher).map(|p| p.id), Some(3));
    }

    #[test]
    fn reselect_replaces_previous() {
        let cat = catalog();
        let mut roster = RosterSelector::new();
        roster.select(Position::Pitcher, cat[0].clone());
        roster.select(Position::Pitcher, cat[2].clone());
        assert_eq!(roster.selected_count(), 1);
        assert_eq!(roster.selected_for(Position::Pitcher).map(|p| p.id), Some(3));
        assert!(roster.clear(Position::Pitcher).is_some());
        assert_eq!(roster.selected_count(), 0);
    }

    #[test]
    fn cursor_is_clamped() {
        let cat = catalog();
        let mut roster = RosterSelector::new();
        roster.move_cursor(-3, &cat);
        assert_eq!(roster.cursor, 0);
        roster.move_cursor(50, &cat);
        assert_eq!(roster.cursor, 8);
    }

    #[test]
    fn retain_known_drops_stale_players() {
        let cat = catalog();
        let mut roster = RosterSelector::new();
        roster.select(Position::Catcher, cat[1].clone());
        roster.select(Position::Pitcher, Player::new(42, "Gone", "T", Position::Pitcher));
        assert_eq!(roster.retain_known(&cat), 1);
        assert!(roster.selected_for(Position::Pitcher).is_none());
    }
}
