use serde::{Deserialize, Serialize};

use crate::catalog::Character;
use crate::types::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateRoom {
        name: String,
        total_sets: Option<u32>,
    },
    JoinRoom {
        name: String,
        room_code: String,
    },
    LeaveRoom {
        room_code: String,
    },
    StartGame {
        room_code: String,
    },
    CharacterChosen {
        room_code: String,
        character_id: CharacterId,
    },
    AskQuestion {
        room_code: String,
        question: String,
    },
    AnswerQuestion {
        room_code: String,
        answer: AnswerValue,
    },
    MakeGuess {
        room_code: String,
        character_id: CharacterId,
    },
    PassTurn {
        room_code: String,
    },
    PlayAgain {
        room_code: String,
    },
}

/// Chooser answers arrive either as a boolean or as free text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    Text(String),
}

impl AnswerValue {
    /// Normalize to the broadcast wording: boolean true or a
    /// case-insensitive "yes" count as yes, anything else as no.
    pub fn normalize(&self) -> &'static str {
        let yes = match self {
            AnswerValue::Bool(b) => *b,
            AnswerValue::Text(s) => s.eq_ignore_ascii_case("yes"),
        };
        if yes {
            "Yes ✅"
        } else {
            "No ❌"
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Handshake sent once per connection
    Welcome {
        protocol: String,
        player_id: PlayerId,
        server_now: String,
    },
    RoomJoined {
        room: RoomSnapshot,
    },
    RoomUpdate {
        room: RoomSnapshot,
    },
    SystemMessage {
        text: String,
    },
    /// Sent only to the chooser with the selectable characters
    ChooserAssigned {
        room_code: RoomCode,
        category: String,
        characters: Vec<Character>,
    },
    GameStarted {
        room: RoomSnapshot,
        category: String,
        characters: Vec<Character>,
    },
    ChatMessage {
        from: PlayerId,
        text: String,
    },
    /// Sent only to the chooser when a question awaits their answer
    AwaitAnswer {
        from: PlayerId,
        question: String,
    },
    /// Sent only to the turn-holder after the chooser answered
    DecisionPhase {
        answer: String,
    },
    RoundTimer {
        time_left: u32,
    },
    NewSet {
        category: String,
        characters: Vec<Character>,
        room: RoomSnapshot,
    },
    RoundOver {
        leaderboard: Vec<LeaderboardEntry>,
        current_round: u32,
        total_rounds: u32,
        current_set: u32,
        total_sets: u32,
    },
    GameOver {
        leaderboard: Vec<LeaderboardEntry>,
    },
    PlayAgainReady {
        room: RoomSnapshot,
    },
    Error {
        code: String,
        msg: String,
    },
}
