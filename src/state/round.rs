//! Round and set orchestration.
//!
//! A set is a full cycle in which every player is chooser exactly once; a
//! round is one chooser's session, running until every guesser has found
//! the secret character (or the round is cancelled). Transitions that need
//! a pause or a countdown are requested as follow-ups and performed by the
//! timer module.

use super::{Effects, FollowUp};
use crate::catalog;
use crate::error::GameError;
use crate::protocol::{AnswerValue, ServerMessage};
use crate::types::*;

impl Room {
    /// Fix the round count to the current player count and start the first
    /// set. Requires the lobby state and at least two players.
    pub fn start_game(&mut self) -> Result<Effects, GameError> {
        if self.status != RoomStatus::Waiting {
            return Err(GameError::GameAlreadyStarted);
        }
        if self.players.len() < 2 {
            return Err(GameError::NeedMorePlayers);
        }

        let mut fx = Effects::new();
        self.total_rounds = self.players.len() as u32;
        fx.room(ServerMessage::SystemMessage {
            text: "🚀 Game starting!".to_string(),
        });
        self.prepare_new_set(&mut fx);
        self.assign_next_chooser(&mut fx);
        Ok(fx)
    }

    /// Draw a fresh category and character list for the upcoming set.
    pub(crate) fn prepare_new_set(&mut self, fx: &mut Effects) {
        let category = catalog::pick_random_category();
        self.category = Some(category.to_string());
        self.characters = catalog::build_characters(category, catalog::SET_SIZE);
        self.secret_character_id = None;
        self.reset_round_tracking();
        fx.room(ServerMessage::NewSet {
            category: category.to_string(),
            characters: self.characters.clone(),
            room: self.snapshot(),
        });
    }

    /// Entry point for the delayed between-rounds transition.
    pub fn next_chooser(&mut self) -> Effects {
        let mut fx = Effects::new();
        self.assign_next_chooser(&mut fx);
        fx
    }

    /// Pick the first player (in room order) who has not yet chosen this
    /// set; when none remains the set is complete.
    pub(crate) fn assign_next_chooser(&mut self, fx: &mut Effects) {
        let next = self
            .players
            .iter()
            .find(|p| !self.has_chosen.contains(&p.id))
            .cloned();
        let Some(next) = next else {
            self.end_set(fx);
            return;
        };

        self.chooser_id = Some(next.id.clone());
        self.status = RoomStatus::Choosing;
        self.correct_guess_order.clear();
        self.guessed_correct.clear();
        self.reset_round_tracking();
        self.active_order = self
            .players
            .iter()
            .filter(|p| p.id != next.id)
            .map(|p| p.id.clone())
            .collect();

        fx.room(ServerMessage::RoomUpdate {
            room: self.snapshot(),
        });
        fx.room(ServerMessage::SystemMessage {
            text: format!("{} is choosing a secret character...", next.name),
        });
        fx.player(
            next.id,
            ServerMessage::ChooserAssigned {
                room_code: self.code.clone(),
                category: self.category.clone().unwrap_or_default(),
                characters: self.characters.clone(),
            },
        );
    }

    /// The chooser has picked the secret; the round goes live with the
    /// first guesser on the clock.
    pub fn character_chosen(&mut self, sender: &PlayerId, character_id: CharacterId) -> Effects {
        let mut fx = Effects::new();
        if self.chooser_id.as_ref() != Some(sender) {
            return fx;
        }

        self.secret_character_id = Some(character_id);
        self.status = RoomStatus::Playing;
        self.round_phase = RoundPhase::AwaitingQuestion;

        let first = self.active_order.first().cloned();
        self.turn_id = first.clone();
        self.guessed_correct.clear();
        self.correct_guess_order.clear();
        if let Some(first) = &first {
            self.mark_turn_start(first, true);
        }

        fx.room(ServerMessage::GameStarted {
            room: self.snapshot(),
            category: self.category.clone().unwrap_or_default(),
            characters: self.characters.clone(),
        });
        fx.room(ServerMessage::SystemMessage {
            text: format!(
                "{} has picked a secret character!",
                self.player_name(sender)
            ),
        });
        self.start_timer(&mut fx);
        fx
    }

    /// Turn-holder asks a yes/no question; the chooser is prompted to answer.
    pub fn ask_question(&mut self, sender: &PlayerId, question: String) -> Effects {
        let mut fx = Effects::new();
        if self.turn_id.as_ref() != Some(sender) {
            return fx;
        }
        if self.round_phase != RoundPhase::AwaitingQuestion {
            return fx;
        }

        fx.room(ServerMessage::ChatMessage {
            from: sender.clone(),
            text: question.clone(),
        });
        self.round_phase = RoundPhase::AwaitingAnswer;
        if let Some(chooser) = self.chooser_id.clone() {
            fx.player(chooser, ServerMessage::AwaitAnswer {
                from: sender.clone(),
                question,
            });
        }
        fx
    }

    /// Chooser answers; the turn-holder moves to the guess-or-pass decision.
    pub fn answer_question(&mut self, sender: &PlayerId, answer: &AnswerValue) -> Effects {
        let mut fx = Effects::new();
        if self.chooser_id.as_ref() != Some(sender) {
            return fx;
        }
        if self.round_phase != RoundPhase::AwaitingAnswer {
            return fx;
        }

        let text = answer.normalize();
        fx.room(ServerMessage::ChatMessage {
            from: sender.clone(),
            text: text.to_string(),
        });
        self.round_phase = RoundPhase::AwaitingDecision;
        if let Some(turn) = self.turn_id.clone() {
            fx.player(turn, ServerMessage::DecisionPhase {
                answer: text.to_string(),
            });
        }
        fx
    }

    /// A guess is allowed at any point of the holder's turn.
    pub fn make_guess(&mut self, sender: &PlayerId, character_id: &CharacterId) -> Effects {
        let mut fx = Effects::new();
        if self.turn_id.as_ref() != Some(sender) {
            return fx;
        }
        let Some(secret) = self.secret_character_id.clone() else {
            return fx;
        };

        if *character_id == secret {
            self.award_points(sender, &mut fx);
        } else {
            fx.player(sender.clone(), ServerMessage::SystemMessage {
                text: "❌ Wrong guess!".to_string(),
            });
            self.advance_turn(true, &mut fx);
        }
        fx
    }

    pub fn pass_turn(&mut self, sender: &PlayerId) -> Effects {
        let mut fx = Effects::new();
        if self.turn_id.as_ref() != Some(sender) {
            return fx;
        }
        self.handle_pass(&mut fx);
        fx
    }

    /// Shared by explicit passes and timer expiry.
    pub(crate) fn handle_pass(&mut self, fx: &mut Effects) {
        let name = self
            .turn_id
            .as_ref()
            .map(|id| self.player_name(id))
            .unwrap_or_else(|| "Player".to_string());
        fx.room(ServerMessage::SystemMessage {
            text: format!("⏩ {} passed their turn.", name),
        });
        self.advance_turn(true, fx);
    }

    /// Close the current round: chooser adjustments, leaderboard broadcast,
    /// and the delayed hand-off to the next chooser.
    pub(crate) fn finish_round(&mut self, fx: &mut Effects) {
        self.stop_timer();
        self.turn_id = None;
        self.round_phase = RoundPhase::BetweenRounds;

        if let Some(chooser) = self.chooser_id.clone() {
            self.has_chosen.insert(chooser);
        }
        let total_guessers = self.guesser_count();
        let guessed_count = self.guessed_correct.len();
        self.apply_chooser_round_adjustments(total_guessers, guessed_count, fx);

        self.current_round = self.has_chosen.len() as u32;

        fx.room(ServerMessage::RoomUpdate {
            room: self.snapshot(),
        });
        fx.room(ServerMessage::RoundOver {
            leaderboard: self.leaderboard(),
            current_round: self.current_round,
            total_rounds: self.total_rounds,
            current_set: self.current_set,
            total_sets: self.total_sets,
        });
        fx.follow_up(FollowUp::ScheduleNextChooser);
    }

    /// Every player has been chooser once: report the set, then either the
    /// next set or the end of the game.
    pub(crate) fn end_set(&mut self, fx: &mut Effects) {
        self.has_chosen.clear();
        self.current_round = 1;
        let finished_set = self.current_set;
        self.current_set += 1;

        fx.room(ServerMessage::RoundOver {
            leaderboard: self.leaderboard(),
            current_round: self.total_rounds,
            total_rounds: self.total_rounds,
            current_set: finished_set,
            total_sets: self.total_sets,
        });

        if self.current_set > self.total_sets {
            self.end_game(fx);
            return;
        }

        fx.room(ServerMessage::SystemMessage {
            text: format!("📦 Starting Set {}/{}...", self.current_set, self.total_sets),
        });
        self.prepare_new_set(fx);
        fx.follow_up(FollowUp::ScheduleNextChooser);
    }

    pub(crate) fn end_game(&mut self, fx: &mut Effects) {
        self.stop_timer();
        self.status = RoomStatus::Over;
        fx.room(ServerMessage::GameOver {
            leaderboard: self.leaderboard(),
        });
    }

    /// Host-initiated rematch from the terminal state.
    pub fn play_again(&mut self, sender: &PlayerId) -> Result<Effects, GameError> {
        let Some(player) = self.player(sender) else {
            return Ok(Effects::new());
        };
        if !player.is_host {
            return Err(GameError::HostOnly);
        }
        if self.status != RoomStatus::Over {
            return Err(GameError::GameInProgress);
        }
        if self.players.len() < 2 {
            return Err(GameError::NeedMorePlayers);
        }

        let mut fx = Effects::new();
        self.reset_for_play_again();
        fx.room(ServerMessage::PlayAgainReady {
            room: self.snapshot(),
        });
        fx.room(ServerMessage::SystemMessage {
            text: "🔁 A new game is starting!".to_string(),
        });
        self.prepare_new_set(&mut fx);
        self.assign_next_chooser(&mut fx);
        Ok(fx)
    }
}
