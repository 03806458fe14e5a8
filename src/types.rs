use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::catalog::Character;

/// Opaque ID types for type safety
pub type PlayerId = String;
pub type RoomCode = String;
pub type CharacterId = String;

/// Room lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Waiting,
    Choosing,
    Playing,
    Over,
}

/// Phase within a live round
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RoundPhase {
    AwaitingQuestion,
    AwaitingAnswer,
    AwaitingDecision,
    BetweenRounds,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
}

/// Per-player cumulative stats, kept across rounds within one game and
/// zeroed on play-again
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerStats {
    pub score: i64,
    pub correct_guesses: u32,
    /// Sum of the attempt numbers on which this player guessed correctly
    pub total_turn_count: u32,
    pub first_turn_wins: u32,
    pub chooser_bonus: i64,
}

impl PlayerStats {
    /// Average attempts-to-correct, None until the first correct guess
    pub fn avg_turn(&self) -> Option<f64> {
        if self.correct_guesses > 0 {
            Some(self.total_turn_count as f64 / self.correct_guesses as f64)
        } else {
            None
        }
    }
}

/// One isolated game instance. All mutation goes through the `Room` methods
/// in the `state` submodules; the secret character never leaves this struct
/// except toward the chooser.
#[derive(Debug)]
pub struct Room {
    pub code: RoomCode,
    pub status: RoomStatus,
    pub current_round: u32,
    /// Fixed to the player count at game start
    pub total_rounds: u32,
    pub current_set: u32,
    pub total_sets: u32,
    pub players: Vec<Player>,
    pub chooser_id: Option<PlayerId>,
    pub turn_id: Option<PlayerId>,
    pub secret_character_id: Option<CharacterId>,
    /// Players who have already been chooser in the current set
    pub has_chosen: HashSet<PlayerId>,
    /// Fixed guesser rotation for the current round (never contains the chooser)
    pub active_order: Vec<PlayerId>,
    pub guessed_correct: HashSet<PlayerId>,
    pub correct_guess_order: Vec<PlayerId>,
    pub round_phase: RoundPhase,
    pub category: Option<String>,
    pub characters: Vec<Character>,
    pub time_left: u32,
    pub join_order: Vec<PlayerId>,
    pub stats: HashMap<PlayerId, PlayerStats>,
    /// Personal attempt counters for the current round
    pub attempt_counts: HashMap<PlayerId, u32>,
    pub last_turn_id: Option<PlayerId>,
    /// Bumped on every timer start/stop; a ticker task whose generation no
    /// longer matches exits without touching the room
    pub timer_gen: u64,
    pub timer_running: bool,
}

/// Room state as exposed to clients (never includes the secret character)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub code: RoomCode,
    pub status: RoomStatus,
    pub current_round: u32,
    pub total_rounds: u32,
    pub current_set: u32,
    pub total_sets: u32,
    pub players: Vec<PlayerSnapshot>,
    pub chooser_id: Option<PlayerId>,
    pub turn_id: Option<PlayerId>,
    pub round_phase: RoundPhase,
    pub time_left: u32,
    pub category: Option<String>,
}

/// Public per-player fields in a room snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
    pub score: i64,
    pub correct_guesses: u32,
    pub avg_turn: Option<f64>,
    pub total_turn_count: u32,
    pub first_turn_wins: u32,
    pub chooser_bonus: i64,
    pub join_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: PlayerId,
    pub name: String,
    pub score: i64,
    pub correct_guesses: u32,
    pub avg_turn: Option<f64>,
    pub first_turn_wins: u32,
    pub chooser_bonus: i64,
}
