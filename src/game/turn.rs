//! Turn and round bookkeeping.
//!
//! Players act in ascending id order. A round ends once every player has
//! ended their turn; the caller then resets units for the new round.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::game::PlayerId;

/// What ending a turn led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Every player finished; a new round began.
    RoundAdvanced {
        /// The round that just started.
        round: u32,
    },
    /// The round continues with `next` acting.
    Passed {
        /// Player now acting.
        next: PlayerId,
    },
}

/// Round counter, acting player and who has finished this round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    round: u32,
    current: PlayerId,
    order: Vec<PlayerId>,
    finished: BTreeSet<PlayerId>,
}

impl TurnState {
    /// Start round 1 with the lowest id acting.
    ///
    /// Duplicate ids are dropped. An empty roster leaves player 0 current.
    #[must_use]
    pub fn new(players: impl IntoIterator<Item = PlayerId>) -> Self {
        let order: Vec<PlayerId> = players
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        Self {
            round: 1,
            current: order.first().copied().unwrap_or_default(),
            order,
            finished: BTreeSet::new(),
        }
    }

    /// Rebuild from saved values.
    ///
    /// Unknown players in `finished` are discarded and an unknown current
    /// player falls back to the first in order.
    #[must_use]
    pub fn restore(
        players: impl IntoIterator<Item = PlayerId>,
        round: u32,
        current: PlayerId,
        finished: impl IntoIterator<Item = PlayerId>,
    ) -> Self {
        let mut state = Self::new(players);
        state.round = round.max(1);
        if state.order.contains(&current) {
            state.current = current;
        }
        state.finished = finished
            .into_iter()
            .filter(|id| state.order.contains(id))
            .collect();
        state
    }

    /// Current round, starting at 1.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Player whose units may act.
    #[must_use]
    pub const fn current(&self) -> PlayerId {
        self.current
    }

    /// Players in turn order.
    #[must_use]
    pub fn order(&self) -> &[PlayerId] {
        &self.order
    }

    /// Players that ended their turn this round.
    #[must_use]
    pub fn finished(&self) -> &BTreeSet<PlayerId> {
        &self.finished
    }

    /// Whether `player` ended their turn this round.
    #[must_use]
    pub fn has_finished(&self, player: PlayerId) -> bool {
        self.finished.contains(&player)
    }

    /// Mark `player` finished and hand the turn on.
    ///
    /// Returns [`TurnOutcome::RoundAdvanced`] once every player is done. The
    /// round counter moves here; resetting units is left to the caller.
    /// Ending another player's turn only marks them finished.
    pub fn end_turn(&mut self, player: PlayerId) -> TurnOutcome {
        self.finished.insert(player);

        if self.order.iter().all(|id| self.finished.contains(id)) {
            self.advance_round();
            return TurnOutcome::RoundAdvanced { round: self.round };
        }

        if player == self.current {
            if let Some(next) = self.next_unfinished() {
                self.current = next;
            }
        }
        TurnOutcome::Passed { next: self.current }
    }

    /// Start the next round with the first player acting.
    ///
    /// The counter stops at `u32::MAX`.
    pub fn advance_round(&mut self) {
        self.round = self.round.saturating_add(1);
        self.finished.clear();
        if let Some(&first) = self.order.first() {
            self.current = first;
        }
    }

    /// First unfinished player after the current one, wrapping.
    fn next_unfinished(&self) -> Option<PlayerId> {
        let start = self.order.iter().position(|&id| id == self.current)?;
        (1..=self.order.len())
            .map(|step| self.order[(start + step) % self.order.len()])
            .find(|id| !self.finished.contains(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let turns = TurnState::new([2, 1, 3]);
        assert_eq!(turns.round(), 1);
        assert_eq!(turns.current(), 1);
        assert_eq!(turns.order(), &[1, 2, 3]);
        assert!(turns.finished().is_empty());
    }

    #[test]
    fn test_rotation_and_round_advance() {
        let mut turns = TurnState::new([1, 2]);

        assert_eq!(turns.end_turn(1), TurnOutcome::Passed { next: 2 });
        assert_eq!(turns.current(), 2);
        assert!(turns.has_finished(1));

        assert_eq!(turns.end_turn(2), TurnOutcome::RoundAdvanced { round: 2 });
        assert_eq!(turns.current(), 1);
        assert!(turns.finished().is_empty());
    }

    #[test]
    fn test_skips_finished_players() {
        let mut turns = TurnState::new([1, 2, 3]);

        assert_eq!(turns.end_turn(2), TurnOutcome::Passed { next: 1 });
        assert_eq!(turns.current(), 1);

        assert_eq!(turns.end_turn(1), TurnOutcome::Passed { next: 3 });
        assert_eq!(turns.end_turn(3), TurnOutcome::RoundAdvanced { round: 2 });
    }

    #[test]
    fn test_wraps_around() {
        let mut turns = TurnState::restore([1, 2, 3], 4, 3, [2]);
        assert_eq!(turns.end_turn(3), TurnOutcome::Passed { next: 1 });
        assert_eq!(turns.round(), 4);
    }

    #[test]
    fn test_restore_sanitizes() {
        let turns = TurnState::restore([1, 2], 0, 9, [2, 7]);
        assert_eq!(turns.round(), 1);
        assert_eq!(turns.current(), 1);
        assert_eq!(turns.finished().iter().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_single_player_rounds() {
        let mut turns = TurnState::new([1]);
        assert_eq!(turns.end_turn(1), TurnOutcome::RoundAdvanced { round: 2 });
        assert_eq!(turns.end_turn(1), TurnOutcome::RoundAdvanced { round: 3 });
    }

    #[test]
    fn test_round_counter_stops_at_max() {
        let mut turns = TurnState::restore([1, 2], u32::MAX, 1, []);
        assert_eq!(turns.end_turn(1), TurnOutcome::Passed { next: 2 });
        assert_eq!(
            turns.end_turn(2),
            TurnOutcome::RoundAdvanced { round: u32::MAX }
        );
        assert!(turns.finished().is_empty());
        assert_eq!(turns.current(), 1);
    }
}
