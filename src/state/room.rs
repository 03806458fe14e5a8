use std::collections::{HashMap, HashSet};

use crate::types::*;

impl Room {
    pub fn new(code: RoomCode, total_sets: u32, host: Player) -> Self {
        let mut room = Self {
            code,
            status: RoomStatus::Waiting,
            current_round: 1,
            total_rounds: 0,
            current_set: 1,
            total_sets: total_sets.max(1),
            players: Vec::new(),
            chooser_id: None,
            turn_id: None,
            secret_character_id: None,
            has_chosen: HashSet::new(),
            active_order: Vec::new(),
            guessed_correct: HashSet::new(),
            correct_guess_order: Vec::new(),
            round_phase: RoundPhase::AwaitingQuestion,
            category: None,
            characters: Vec::new(),
            time_left: 0,
            join_order: Vec::new(),
            stats: HashMap::new(),
            attempt_counts: HashMap::new(),
            last_turn_id: None,
            timer_gen: 0,
            timer_running: false,
        };
        room.add_player(host);
        room
    }

    pub fn add_player(&mut self, player: Player) {
        if !self.join_order.contains(&player.id) {
            self.join_order.push(player.id.clone());
        }
        self.stats.insert(player.id.clone(), PlayerStats::default());
        self.players.push(player);
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub fn player_name(&self, id: &PlayerId) -> String {
        self.player(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "Player".to_string())
    }

    pub fn join_index(&self, id: &PlayerId) -> usize {
        self.join_order
            .iter()
            .position(|j| j == id)
            .unwrap_or(usize::MAX)
    }

    /// Players other than the current chooser
    pub fn guesser_count(&self) -> usize {
        self.players
            .iter()
            .filter(|p| self.chooser_id.as_ref() != Some(&p.id))
            .count()
    }

    /// Clear the per-round attempt tracking
    pub fn reset_round_tracking(&mut self) {
        self.attempt_counts.clear();
        self.last_turn_id = None;
    }

    /// Client-facing view; the secret character id never appears here.
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            code: self.code.clone(),
            status: self.status,
            current_round: self.current_round,
            total_rounds: self.total_rounds,
            current_set: self.current_set,
            total_sets: self.total_sets,
            players: self
                .players
                .iter()
                .map(|p| {
                    let stats = self.stats.get(&p.id).cloned().unwrap_or_default();
                    PlayerSnapshot {
                        id: p.id.clone(),
                        name: p.name.clone(),
                        is_host: p.is_host,
                        score: stats.score,
                        correct_guesses: stats.correct_guesses,
                        avg_turn: stats.avg_turn(),
                        total_turn_count: stats.total_turn_count,
                        first_turn_wins: stats.first_turn_wins,
                        chooser_bonus: stats.chooser_bonus,
                        join_index: self.join_index(&p.id),
                    }
                })
                .collect(),
            chooser_id: self.chooser_id.clone(),
            turn_id: self.turn_id.clone(),
            round_phase: self.round_phase,
            time_left: self.time_left,
            category: self.category.clone(),
        }
    }

    /// Full reset for a host-initiated rematch: back to the lobby with all
    /// stats and round/set counters zeroed.
    pub fn reset_for_play_again(&mut self) {
        self.stop_timer();
        self.status = RoomStatus::Waiting;
        self.current_round = 1;
        self.current_set = 1;
        self.chooser_id = None;
        self.turn_id = None;
        self.secret_character_id = None;
        self.has_chosen.clear();
        self.correct_guess_order.clear();
        self.guessed_correct.clear();
        self.active_order.clear();
        self.round_phase = RoundPhase::AwaitingQuestion;
        self.time_left = 0;
        self.category = None;
        self.characters.clear();
        self.reset_round_tracking();
        self.total_rounds = self.players.len() as u32;
        for player in &self.players {
            self.stats.insert(player.id.clone(), PlayerStats::default());
        }
    }
}
