//! Departure handling.
//!
//! A leaving player is stripped from every tracking structure first, then a
//! five-way policy decides what happens to the round, checked in priority
//! order: empty room, departing chooser, abandoned chooser, departing
//! turn-holder, departing guesser.

use super::{Effects, FollowUp};
use crate::protocol::ServerMessage;
use crate::types::*;

impl Room {
    /// Drop the player from all room records. Returns their display name,
    /// or None if they were not in the room.
    fn remove_player_records(&mut self, player_id: &PlayerId) -> Option<String> {
        let idx = self.players.iter().position(|p| &p.id == player_id)?;
        let name = self.players.remove(idx).name;

        self.stats.remove(player_id);
        self.attempt_counts.remove(player_id);
        self.join_order.retain(|id| id != player_id);
        self.active_order.retain(|id| id != player_id);
        self.guessed_correct.remove(player_id);
        Some(name)
    }

    /// Reset the round after the chooser vanished; nobody keeps points from
    /// the aborted round (scores already banked stay banked).
    fn cancel_round(&mut self) {
        self.secret_character_id = None;
        self.guessed_correct.clear();
        self.correct_guess_order.clear();
        self.reset_round_tracking();
        self.turn_id = None;
        self.round_phase = RoundPhase::AwaitingQuestion;
    }

    pub fn handle_player_leave(&mut self, player_id: &PlayerId) -> Effects {
        let mut fx = Effects::new();
        let Some(name) = self.remove_player_records(player_id) else {
            return fx;
        };

        let was_chooser = self.chooser_id.as_ref() == Some(player_id);
        let was_turn_holder = self.turn_id.as_ref() == Some(player_id);
        let was_playing = self.status == RoomStatus::Playing;

        if self.players.is_empty() {
            self.stop_timer();
            fx.follow_up(FollowUp::DestroyRoom);
            return fx;
        }

        if was_chooser && was_playing {
            self.stop_timer();
            fx.room(ServerMessage::SystemMessage {
                text: "⚠️ The chooser left the game. This round has been cancelled.".to_string(),
            });
            self.cancel_round();
            // The departed chooser does not count as having chosen
            self.has_chosen.remove(player_id);
            self.assign_next_chooser(&mut fx);
            return fx;
        }

        let lone_chooser = self.players.len() == 1
            && self.chooser_id.as_ref() == Some(&self.players[0].id);
        if lone_chooser && was_playing {
            self.stop_timer();
            fx.room(ServerMessage::SystemMessage {
                text: "❗ All players left — ending the current round.".to_string(),
            });
            self.cancel_round();
            self.assign_next_chooser(&mut fx);
            return fx;
        }

        if was_turn_holder && was_playing {
            fx.room(ServerMessage::SystemMessage {
                text: format!("⏩ {} left during their turn — skipping to the next player.", name),
            });
            self.advance_turn(true, &mut fx);
            return fx;
        }

        if was_playing && !was_chooser && !was_turn_holder {
            fx.room(ServerMessage::SystemMessage {
                text: format!("🚪 {} left the game.", name),
            });
            let total_guessers = self.guesser_count();
            if total_guessers > 0 && self.guessed_correct.len() >= total_guessers {
                // The departure made the round complete
                self.finish_round(&mut fx);
                return fx;
            }
        }

        fx.room(ServerMessage::RoomUpdate {
            room: self.snapshot(),
        });
        fx
    }
}
