mod disconnect;
mod room;
mod round;
mod score;
mod turn;

pub use score::points_for_attempt;

use std::collections::HashMap;
use std::sync::Arc;

use rand::prelude::*;
use tokio::sync::{mpsc, Mutex, RwLock};

use crate::error::GameError;
use crate::protocol::ServerMessage;
use crate::timer;
use crate::types::*;

/// Safe character set for room codes (excludes 0/O, 1/I/L to avoid confusion)
const CODE_CHARS: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 6;

fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

/// Where an outbound event goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// Every player currently in the room
    Room,
    /// One specific player
    Player(PlayerId),
}

#[derive(Debug, Clone)]
pub struct Outbound {
    pub to: Recipient,
    pub msg: ServerMessage,
}

/// Deferred work a room mutation requests; interpreted only after the room
/// lock is released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// Spawn a ticker for exactly this timer generation
    RestartTimer(u64),
    /// Assign the next chooser after the between-rounds pause
    ScheduleNextChooser,
    /// Remove the (now empty) room from the registry
    DestroyRoom,
}

/// The auditable result of applying one command or tick to a room: the
/// events to deliver plus any deferred transitions.
#[derive(Debug, Default)]
pub struct Effects {
    pub outbound: Vec<Outbound>,
    pub follow_ups: Vec<FollowUp>,
}

impl Effects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn room(&mut self, msg: ServerMessage) {
        self.outbound.push(Outbound {
            to: Recipient::Room,
            msg,
        });
    }

    pub fn player(&mut self, id: PlayerId, msg: ServerMessage) {
        self.outbound.push(Outbound {
            to: Recipient::Player(id),
            msg,
        });
    }

    pub fn follow_up(&mut self, follow_up: FollowUp) {
        self.follow_ups.push(follow_up);
    }
}

/// Shared application state: the room registry plus the per-connection
/// delivery channels. Rooms are independent; each one is serialized behind
/// its own mutex.
pub struct AppState {
    rooms: RwLock<HashMap<RoomCode, Arc<Mutex<Room>>>>,
    connections: RwLock<HashMap<PlayerId, mpsc::UnboundedSender<ServerMessage>>>,
    /// A player is in at most one room at a time
    membership: RwLock<HashMap<PlayerId, RoomCode>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            connections: RwLock::new(HashMap::new()),
            membership: RwLock::new(HashMap::new()),
        }
    }

    // ---- connection registry ----

    pub async fn register_connection(
        &self,
        player_id: PlayerId,
        tx: mpsc::UnboundedSender<ServerMessage>,
    ) {
        self.connections.write().await.insert(player_id, tx);
    }

    pub async fn remove_connection(&self, player_id: &PlayerId) {
        self.connections.write().await.remove(player_id);
    }

    pub async fn send_to(&self, player_id: &PlayerId, msg: ServerMessage) {
        if let Some(tx) = self.connections.read().await.get(player_id) {
            let _ = tx.send(msg);
        }
    }

    pub async fn send_to_many(&self, player_ids: &[PlayerId], msg: &ServerMessage) {
        let connections = self.connections.read().await;
        for id in player_ids {
            if let Some(tx) = connections.get(id) {
                let _ = tx.send(msg.clone());
            }
        }
    }

    // ---- room registry ----

    pub async fn room(&self, code: &str) -> Option<Arc<Mutex<Room>>> {
        self.rooms.read().await.get(code).cloned()
    }

    pub async fn remove_room(&self, code: &str) {
        self.rooms.write().await.remove(code);
        tracing::info!(room = %code, "Room closed (no players left)");
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn room_code_of(&self, player_id: &PlayerId) -> Option<RoomCode> {
        self.membership.read().await.get(player_id).cloned()
    }

    /// Create a room with a collision-free code and the creator as host.
    pub async fn create_room(
        &self,
        player_id: &PlayerId,
        name: String,
        total_sets: u32,
    ) -> (RoomCode, Effects) {
        let host = Player {
            id: player_id.clone(),
            name: if name.trim().is_empty() {
                "Host".to_string()
            } else {
                name
            },
            is_host: true,
        };

        let mut rooms = self.rooms.write().await;
        let code = loop {
            let candidate = generate_room_code();
            if !rooms.contains_key(&candidate) {
                break candidate;
            }
            // Collision, retry
        };

        let room = Room::new(code.clone(), total_sets, host);
        let snapshot = room.snapshot();
        rooms.insert(code.clone(), Arc::new(Mutex::new(room)));
        drop(rooms);

        self.membership
            .write()
            .await
            .insert(player_id.clone(), code.clone());

        tracing::info!(room = %code, player = %player_id, "Room created");

        let mut fx = Effects::new();
        fx.player(
            player_id.clone(),
            ServerMessage::RoomJoined {
                room: snapshot.clone(),
            },
        );
        fx.room(ServerMessage::RoomUpdate { room: snapshot });
        (code, fx)
    }

    /// Join an existing room; rejected once the game has started.
    pub async fn join_room(
        &self,
        player_id: &PlayerId,
        name: String,
        room_code: String,
    ) -> Result<(RoomCode, Effects), GameError> {
        let code = room_code.trim().to_uppercase();
        let room = self.room(&code).await.ok_or(GameError::RoomNotFound)?;

        let mut room = room.lock().await;
        if room.status != RoomStatus::Waiting {
            return Err(GameError::GameAlreadyStarted);
        }

        room.add_player(Player {
            id: player_id.clone(),
            name: if name.trim().is_empty() {
                "Player".to_string()
            } else {
                name
            },
            is_host: false,
        });
        let snapshot = room.snapshot();
        drop(room);

        self.membership
            .write()
            .await
            .insert(player_id.clone(), code.clone());

        tracing::info!(room = %code, player = %player_id, "Player joined");

        let mut fx = Effects::new();
        fx.player(
            player_id.clone(),
            ServerMessage::RoomJoined {
                room: snapshot.clone(),
            },
        );
        fx.room(ServerMessage::RoomUpdate { room: snapshot });
        Ok((code, fx))
    }

    /// Run one serialized mutation against a room. Returns None when the
    /// room does not exist (such commands are silently ignored).
    pub async fn apply<F, R>(&self, code: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut Room) -> R,
    {
        let room = self.room(code).await?;
        let mut room = room.lock().await;
        Some(f(&mut room))
    }

    /// Deliver outbound events and interpret follow-ups. Must be called
    /// without holding the room lock.
    pub async fn dispatch(self: &Arc<Self>, code: &RoomCode, effects: Effects) {
        let members: Vec<PlayerId> = match self.room(code).await {
            Some(room) => room.lock().await.players.iter().map(|p| p.id.clone()).collect(),
            None => Vec::new(),
        };

        for out in effects.outbound {
            match out.to {
                Recipient::Room => self.send_to_many(&members, &out.msg).await,
                Recipient::Player(id) => self.send_to(&id, out.msg).await,
            }
        }

        for follow_up in effects.follow_ups {
            match follow_up {
                FollowUp::RestartTimer(generation) => {
                    timer::spawn_round_ticker(self.clone(), code.clone(), generation)
                }
                FollowUp::ScheduleNextChooser => {
                    timer::schedule_next_chooser(self.clone(), code.clone())
                }
                FollowUp::DestroyRoom => self.remove_room(code).await,
            }
        }
    }

    /// Departure shared by explicit leave and socket close.
    pub async fn leave_room(self: &Arc<Self>, player_id: &PlayerId, code: &RoomCode) {
        if let Some(effects) = self.apply(code, |room| room.handle_player_leave(player_id)).await {
            self.dispatch(code, effects).await;
        }

        let mut membership = self.membership.write().await;
        if membership.get(player_id) == Some(code) {
            membership.remove(player_id);
        }
    }

    /// Connection loss: find the player's room (if any) and run the leave path.
    pub async fn handle_disconnect(self: &Arc<Self>, player_id: &PlayerId) {
        if let Some(code) = self.room_code_of(player_id).await {
            tracing::info!(room = %code, player = %player_id, "Player disconnected");
            self.leave_room(player_id, &code).await;
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str, name: &str, is_host: bool) -> Player {
        Player {
            id: id.to_string(),
            name: name.to_string(),
            is_host,
        }
    }

    #[tokio::test]
    async fn create_room_registers_a_six_char_code() {
        let state = Arc::new(AppState::new());
        let (code, fx) = state.create_room(&"p1".to_string(), "Ada".into(), 2).await;

        assert_eq!(code.len(), 6);
        assert!(code.bytes().all(|b| CODE_CHARS.contains(&b)));
        assert!(state.room(&code).await.is_some());
        assert_eq!(state.room_count().await, 1);
        assert_eq!(state.room_code_of(&"p1".to_string()).await, Some(code));
        assert_eq!(fx.outbound.len(), 2);
    }

    #[tokio::test]
    async fn join_rejected_after_game_start() {
        let state = Arc::new(AppState::new());
        let (code, _) = state.create_room(&"p1".to_string(), "Ada".into(), 1).await;

        let room = state.room(&code).await.unwrap();
        room.lock().await.status = RoomStatus::Playing;

        let err = state
            .join_room(&"p2".to_string(), "Bob".into(), code.clone())
            .await
            .unwrap_err();
        assert_eq!(err, GameError::GameAlreadyStarted);
    }

    #[tokio::test]
    async fn join_unknown_room_is_an_explicit_error() {
        let state = Arc::new(AppState::new());
        let err = state
            .join_room(&"p1".to_string(), "Ada".into(), "zzzzzz".into())
            .await
            .unwrap_err();
        assert_eq!(err, GameError::RoomNotFound);
    }

    #[tokio::test]
    async fn room_destroyed_when_last_player_leaves() {
        let state = Arc::new(AppState::new());
        let (code, _) = state.create_room(&"p1".to_string(), "Ada".into(), 1).await;

        state.leave_room(&"p1".to_string(), &code).await;

        assert!(state.room(&code).await.is_none());
        assert_eq!(state.room_count().await, 0);
        assert_eq!(state.room_code_of(&"p1".to_string()).await, None);
    }

    #[tokio::test]
    async fn join_code_lookup_is_case_insensitive() {
        let state = Arc::new(AppState::new());
        let (code, _) = state.create_room(&"p1".to_string(), "Ada".into(), 1).await;

        let (joined, _) = state
            .join_room(&"p2".to_string(), "Bob".into(), code.to_lowercase())
            .await
            .unwrap();
        assert_eq!(joined, code);

        let room = state.room(&code).await.unwrap();
        let room = room.lock().await;
        assert_eq!(room.players.len(), 2);
        assert_eq!(room.players[1], player("p2", "Bob", false));
    }
}
