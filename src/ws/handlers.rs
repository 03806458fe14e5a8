//! Command dispatch.
//!
//! Each client command is routed to the registry or to a serialized room
//! mutation; the resulting effects are delivered through the connection
//! registry. The return value is the direct reply for validation
//! rejections; commands that are merely inapplicable (unknown room on most
//! actions, acting out of turn or phase) are dropped without an error.

use std::sync::Arc;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use crate::types::PlayerId;

pub async fn handle_message(
    state: &Arc<AppState>,
    player_id: &PlayerId,
    msg: ClientMessage,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::CreateRoom { name, total_sets } => {
            let (code, effects) = state
                .create_room(player_id, name, total_sets.unwrap_or(1))
                .await;
            state.dispatch(&code, effects).await;
            None
        }

        ClientMessage::JoinRoom { name, room_code } => {
            match state.join_room(player_id, name, room_code).await {
                Ok((code, effects)) => {
                    state.dispatch(&code, effects).await;
                    None
                }
                Err(e) => Some(e.into()),
            }
        }

        ClientMessage::LeaveRoom { room_code } => {
            state.leave_room(player_id, &room_code).await;
            None
        }

        ClientMessage::StartGame { room_code } => {
            let result = state.apply(&room_code, |room| room.start_game()).await?;
            match result {
                Ok(effects) => {
                    state.dispatch(&room_code, effects).await;
                    None
                }
                Err(e) => Some(e.into()),
            }
        }

        ClientMessage::CharacterChosen {
            room_code,
            character_id,
        } => {
            let effects = state
                .apply(&room_code, |room| room.character_chosen(player_id, character_id))
                .await?;
            state.dispatch(&room_code, effects).await;
            None
        }

        ClientMessage::AskQuestion { room_code, question } => {
            let effects = state
                .apply(&room_code, |room| room.ask_question(player_id, question))
                .await?;
            state.dispatch(&room_code, effects).await;
            None
        }

        ClientMessage::AnswerQuestion { room_code, answer } => {
            let effects = state
                .apply(&room_code, |room| room.answer_question(player_id, &answer))
                .await?;
            state.dispatch(&room_code, effects).await;
            None
        }

        ClientMessage::MakeGuess {
            room_code,
            character_id,
        } => {
            let effects = state
                .apply(&room_code, |room| room.make_guess(player_id, &character_id))
                .await?;
            state.dispatch(&room_code, effects).await;
            None
        }

        ClientMessage::PassTurn { room_code } => {
            let effects = state
                .apply(&room_code, |room| room.pass_turn(player_id))
                .await?;
            state.dispatch(&room_code, effects).await;
            None
        }

        ClientMessage::PlayAgain { room_code } => {
            let result = state.apply(&room_code, |room| room.play_again(player_id)).await?;
            match result {
                Ok(effects) => {
                    state.dispatch(&room_code, effects).await;
                    None
                }
                Err(e) => Some(e.into()),
            }
        }
    }
}
