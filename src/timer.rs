//! Per-room countdown and deferred transitions.
//!
//! The countdown itself lives in the room state (`time_left`, `timer_gen`,
//! `timer_running`); background tasks only drive it. A ticker is handed the
//! timer generation it was spawned for and exits as soon as the room is
//! gone or the generation moved, so at most one ticker is ever live per
//! room. The between-rounds pause is the same kind of task and re-checks
//! that the room still exists before acting, since a disconnect cascade may
//! have destroyed it during the delay.

use std::sync::Arc;
use std::time::Duration;

use crate::protocol::ServerMessage;
use crate::state::{AppState, Effects};
use crate::types::{Room, RoomCode};

/// Seconds on the clock at every turn start
pub const ROUND_SECONDS: u32 = 60;
/// Pause between a round ending and the next chooser being assigned
pub const NEXT_CHOOSER_DELAY: Duration = Duration::from_secs(3);

const TICK: Duration = Duration::from_secs(1);

impl Room {
    /// Reset the countdown for a fresh turn and invalidate any older ticker.
    pub(crate) fn start_timer(&mut self, fx: &mut Effects) {
        self.timer_gen += 1;
        self.timer_running = true;
        self.time_left = ROUND_SECONDS;
        fx.room(ServerMessage::RoundTimer {
            time_left: self.time_left,
        });
        fx.follow_up(crate::state::FollowUp::RestartTimer(self.timer_gen));
    }

    pub(crate) fn stop_timer(&mut self) {
        self.timer_gen += 1;
        self.timer_running = false;
    }

    /// One second elapsed. At zero the turn is auto-passed.
    pub fn tick(&mut self) -> Effects {
        let mut fx = Effects::new();
        self.time_left = self.time_left.saturating_sub(1);
        fx.room(ServerMessage::RoundTimer {
            time_left: self.time_left,
        });

        if self.time_left == 0 {
            fx.room(ServerMessage::SystemMessage {
                text: "⏱️ Time's up! Auto-pass.".to_string(),
            });
            self.stop_timer();
            self.handle_pass(&mut fx);
        }
        fx
    }
}

/// Drive the countdown for one specific timer generation. The generation is
/// fixed at the `start_timer` call that requested this ticker; reading it
/// from the room instead would let a not-yet-polled ticker adopt a newer
/// generation and run alongside its replacement.
pub fn spawn_round_ticker(state: Arc<AppState>, code: RoomCode, generation: u64) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(TICK).await;
            let Some(room) = state.room(&code).await else {
                return;
            };
            let effects = {
                let mut room = room.lock().await;
                if room.timer_gen != generation || !room.timer_running {
                    return;
                }
                room.tick()
            };
            state.dispatch(&code, effects).await;
        }
    });
}

/// Hand the room to its next chooser after the between-rounds pause.
pub fn schedule_next_chooser(state: Arc<AppState>, code: RoomCode) {
    tokio::spawn(async move {
        tokio::time::sleep(NEXT_CHOOSER_DELAY).await;
        // The room may have emptied out during the pause
        let Some(room) = state.room(&code).await else {
            tracing::debug!(room = %code, "Skipping chooser assignment for destroyed room");
            return;
        };
        let effects = {
            let mut room = room.lock().await;
            room.next_chooser()
        };
        state.dispatch(&code, effects).await;
    });
}
