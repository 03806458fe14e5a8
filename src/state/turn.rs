//! Turn scheduling for a live round.
//!
//! The rotation cycles through the round's fixed active order, skipping
//! players who already guessed correctly. Each turn start bumps the
//! holder's personal attempt counter, which is what the scoring table is
//! indexed by.

use super::Effects;
use crate::protocol::ServerMessage;
use crate::types::*;

impl Room {
    /// Record a turn start for `player_id`. The attempt counter increments
    /// when the holder changed since the last recorded turn, or
    /// unconditionally on a forced advance.
    pub(crate) fn mark_turn_start(&mut self, player_id: &PlayerId, advanced: bool) {
        let count = self.attempt_counts.entry(player_id.clone()).or_insert(0);
        if advanced || self.last_turn_id.as_ref() != Some(player_id) {
            *count += 1;
            self.last_turn_id = Some(player_id.clone());
        }
    }

    /// Current attempt number for a player, clamped to at least 1
    pub fn attempt_number(&self, player_id: &PlayerId) -> u32 {
        match self.attempt_counts.get(player_id) {
            Some(n) if *n > 0 => *n,
            _ => 1,
        }
    }

    /// Move the turn to the next eligible guesser. Returns false when no
    /// guesser is left to act, in which case the caller decides whether the
    /// round is over.
    ///
    /// If the current holder is no longer eligible (they just guessed
    /// correctly), the turn jumps to the first eligible player; otherwise a
    /// forced advance moves cyclically to the next one.
    pub fn advance_turn(&mut self, force: bool, fx: &mut Effects) -> bool {
        let active: Vec<PlayerId> = self
            .active_order
            .iter()
            .filter(|id| !self.guessed_correct.contains(*id))
            .cloned()
            .collect();
        if active.is_empty() {
            return false;
        }

        let prev = self.turn_id.clone();
        match prev.as_ref().and_then(|t| active.iter().position(|id| id == t)) {
            None => self.turn_id = Some(active[0].clone()),
            Some(idx) if force => {
                self.turn_id = Some(active[(idx + 1) % active.len()].clone());
            }
            Some(_) => {}
        }

        if let Some(holder) = self.turn_id.clone() {
            self.mark_turn_start(&holder, force || prev.as_ref() != Some(&holder));
            self.round_phase = RoundPhase::AwaitingQuestion;
            self.start_timer(fx);
            fx.room(ServerMessage::RoomUpdate {
                room: self.snapshot(),
            });
            fx.room(ServerMessage::SystemMessage {
                text: format!("👉 {}'s turn!", self.player_name(&holder)),
            });
        }
        true
    }
}
