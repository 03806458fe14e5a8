use guesswho::protocol::{AnswerValue, ClientMessage, ServerMessage};
use guesswho::state::AppState;
use guesswho::types::{RoomStatus, RoundPhase};
use guesswho::ws::handlers::handle_message;
use std::sync::Arc;
use tokio::sync::mpsc;

type Inbox = mpsc::UnboundedReceiver<ServerMessage>;

async fn connect(state: &Arc<AppState>, player_id: &str) -> Inbox {
    let (tx, rx) = mpsc::unbounded_channel();
    state.register_connection(player_id.to_string(), tx).await;
    rx
}

fn drain(rx: &mut Inbox) -> Vec<ServerMessage> {
    let mut messages = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        messages.push(msg);
    }
    messages
}

fn system_texts(messages: &[ServerMessage]) -> Vec<String> {
    messages
        .iter()
        .filter_map(|m| match m {
            ServerMessage::SystemMessage { text } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

/// Create a room for the host and return its code.
async fn create_room(state: &Arc<AppState>, host: &str, rx: &mut Inbox, total_sets: u32) -> String {
    handle_message(
        state,
        &host.to_string(),
        ClientMessage::CreateRoom {
            name: host.to_string(),
            total_sets: Some(total_sets),
        },
    )
    .await;

    drain(rx)
        .into_iter()
        .find_map(|m| match m {
            ServerMessage::RoomJoined { room } => Some(room.code),
            _ => None,
        })
        .expect("room_joined after create_room")
}

async fn secret_candidates(state: &Arc<AppState>, code: &str) -> Vec<String> {
    let room = state.room(code).await.expect("room exists");
    let room = room.lock().await;
    room.characters.iter().map(|c| c.id.clone()).collect()
}

/// End-to-end run of the three-player scoring scenario: C finds the secret
/// on attempt 1, B on attempt 2, and the chooser takes the too-easy penalty.
#[tokio::test]
async fn test_full_round_scoring_flow() {
    let state = Arc::new(AppState::new());
    let a = "player-a".to_string();
    let b = "player-b".to_string();
    let c = "player-c".to_string();
    let mut rx_a = connect(&state, &a).await;
    let mut rx_b = connect(&state, &b).await;
    let mut rx_c = connect(&state, &c).await;

    let code = create_room(&state, &a, &mut rx_a, 1).await;

    for (id, name) in [(&b, "Bob"), (&c, "Cleo")] {
        let reply = handle_message(
            &state,
            id,
            ClientMessage::JoinRoom {
                name: name.to_string(),
                room_code: code.clone(),
            },
        )
        .await;
        assert!(reply.is_none(), "join should not error");
    }

    // Starting with a single player elsewhere fails; here it proceeds
    let reply = handle_message(
        &state,
        &a,
        ClientMessage::StartGame {
            room_code: code.clone(),
        },
    )
    .await;
    assert!(reply.is_none());

    // First chooser is the host by join order; only they got the characters
    let chooser_assigned = drain(&mut rx_a)
        .into_iter()
        .any(|m| matches!(m, ServerMessage::ChooserAssigned { .. }));
    assert!(chooser_assigned);
    assert!(!drain(&mut rx_b)
        .iter()
        .any(|m| matches!(m, ServerMessage::ChooserAssigned { .. })));

    let characters = secret_candidates(&state, &code).await;
    let secret = characters[2].clone();
    let wrong = characters[5].clone();

    handle_message(
        &state,
        &a,
        ClientMessage::CharacterChosen {
            room_code: code.clone(),
            character_id: secret.clone(),
        },
    )
    .await;

    {
        let room = state.room(&code).await.unwrap();
        let room = room.lock().await;
        assert_eq!(room.status, RoomStatus::Playing);
        assert_eq!(room.turn_id.as_deref(), Some(b.as_str()));
        assert_eq!(room.active_order, vec![b.clone(), c.clone()]);
    }

    // B asks, A answers yes, B is told to decide
    handle_message(
        &state,
        &b,
        ClientMessage::AskQuestion {
            room_code: code.clone(),
            question: "Does it fly?".to_string(),
        },
    )
    .await;
    assert!(drain(&mut rx_a)
        .iter()
        .any(|m| matches!(m, ServerMessage::AwaitAnswer { .. })));

    handle_message(
        &state,
        &a,
        ClientMessage::AnswerQuestion {
            room_code: code.clone(),
            answer: AnswerValue::Bool(true),
        },
    )
    .await;
    assert!(drain(&mut rx_b).iter().any(|m| matches!(
        m,
        ServerMessage::DecisionPhase { answer } if answer == "Yes ✅"
    )));

    // B guesses wrong: only B hears about it, turn moves to C
    handle_message(
        &state,
        &b,
        ClientMessage::MakeGuess {
            room_code: code.clone(),
            character_id: wrong.clone(),
        },
    )
    .await;
    assert!(system_texts(&drain(&mut rx_b))
        .iter()
        .any(|t| t.contains("Wrong guess")));
    assert!(!system_texts(&drain(&mut rx_c))
        .iter()
        .any(|t| t.contains("Wrong guess")));

    // C guesses right on attempt 1: 1000 pts, chooser bonus 500
    handle_message(
        &state,
        &c,
        ClientMessage::MakeGuess {
            room_code: code.clone(),
            character_id: secret.clone(),
        },
    )
    .await;

    // B comes back around and finds it on attempt 2: 800 pts, bonus 400,
    // round complete, chooser penalized 200 for the full sweep
    handle_message(
        &state,
        &b,
        ClientMessage::MakeGuess {
            room_code: code.clone(),
            character_id: secret.clone(),
        },
    )
    .await;

    let messages = drain(&mut rx_a);
    let round_over = messages
        .iter()
        .find_map(|m| match m {
            ServerMessage::RoundOver { leaderboard, .. } => Some(leaderboard.clone()),
            _ => None,
        })
        .expect("round_over broadcast");

    let ranked: Vec<(String, i64)> = round_over
        .iter()
        .map(|e| (e.name.clone(), e.score))
        .collect();
    assert_eq!(
        ranked,
        vec![
            ("Cleo".to_string(), 1000),
            ("Bob".to_string(), 800),
            ("player-a".to_string(), 700),
        ]
    );

    let room = state.room(&code).await.unwrap();
    let room = room.lock().await;
    assert_eq!(room.round_phase, RoundPhase::BetweenRounds);
    assert!(room.has_chosen.contains(&a));
    assert_eq!(room.stats[&a].chooser_bonus, 900);
    assert_eq!(room.stats[&b].total_turn_count, 2);
    assert_eq!(room.stats[&c].first_turn_wins, 1);
}

#[tokio::test]
async fn test_join_unknown_room_errors() {
    let state = Arc::new(AppState::new());
    let p = "player-x".to_string();
    let _rx = connect(&state, &p).await;

    let reply = handle_message(
        &state,
        &p,
        ClientMessage::JoinRoom {
            name: "Xena".to_string(),
            room_code: "NOPE42".to_string(),
        },
    )
    .await;

    match reply {
        Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "ROOM_NOT_FOUND"),
        other => panic!("expected error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_chooser_disconnect_cancels_round() {
    let state = Arc::new(AppState::new());
    let a = "player-a".to_string();
    let b = "player-b".to_string();
    let c = "player-c".to_string();
    let mut rx_a = connect(&state, &a).await;
    let mut rx_b = connect(&state, &b).await;
    let _rx_c = connect(&state, &c).await;

    let code = create_room(&state, &a, &mut rx_a, 1).await;
    for (id, name) in [(&b, "Bob"), (&c, "Cleo")] {
        handle_message(
            &state,
            id,
            ClientMessage::JoinRoom {
                name: name.to_string(),
                room_code: code.clone(),
            },
        )
        .await;
    }
    handle_message(
        &state,
        &a,
        ClientMessage::StartGame {
            room_code: code.clone(),
        },
    )
    .await;
    let secret = secret_candidates(&state, &code).await[0].clone();
    handle_message(
        &state,
        &a,
        ClientMessage::CharacterChosen {
            room_code: code.clone(),
            character_id: secret,
        },
    )
    .await;
    drain(&mut rx_b);

    // The chooser's connection drops mid-round
    state.handle_disconnect(&a).await;

    let messages = drain(&mut rx_b);
    assert!(system_texts(&messages)
        .iter()
        .any(|t| t.contains("cancelled")));
    // B is the new chooser, assigned without the 3-second pause
    assert!(messages
        .iter()
        .any(|m| matches!(m, ServerMessage::ChooserAssigned { .. })));

    let room = state.room(&code).await.unwrap();
    let room = room.lock().await;
    assert_eq!(room.status, RoomStatus::Choosing);
    assert_eq!(room.chooser_id.as_deref(), Some(b.as_str()));
    assert!(room.secret_character_id.is_none());
    assert!(!room.has_chosen.contains(&a));
    // No points survive from the aborted round
    assert!(room.stats.values().all(|s| s.score == 0));
}

#[tokio::test(start_paused = true)]
async fn test_timer_expiry_auto_passes() {
    let state = Arc::new(AppState::new());
    let a = "player-a".to_string();
    let b = "player-b".to_string();
    let c = "player-c".to_string();
    let mut rx_a = connect(&state, &a).await;
    let _rx_b = connect(&state, &b).await;
    let _rx_c = connect(&state, &c).await;

    let code = create_room(&state, &a, &mut rx_a, 1).await;
    for (id, name) in [(&b, "Bob"), (&c, "Cleo")] {
        handle_message(
            &state,
            id,
            ClientMessage::JoinRoom {
                name: name.to_string(),
                room_code: code.clone(),
            },
        )
        .await;
    }
    handle_message(
        &state,
        &a,
        ClientMessage::StartGame {
            room_code: code.clone(),
        },
    )
    .await;
    let secret = secret_candidates(&state, &code).await[0].clone();
    handle_message(
        &state,
        &a,
        ClientMessage::CharacterChosen {
            room_code: code.clone(),
            character_id: secret,
        },
    )
    .await;

    {
        let room = state.room(&code).await.unwrap();
        let room = room.lock().await;
        assert_eq!(room.turn_id.as_deref(), Some(b.as_str()));
    }

    // Let the full countdown elapse with no player action
    tokio::time::sleep(std::time::Duration::from_millis(60_500)).await;

    let room = state.room(&code).await.unwrap();
    let room = room.lock().await;
    assert_eq!(
        room.turn_id.as_deref(),
        Some(c.as_str()),
        "auto-pass should advance the turn"
    );
    assert!(room.timer_running, "a fresh countdown should be running");
    assert!(room.time_left >= 59, "countdown restarts at 60");

    let texts = system_texts(&drain(&mut rx_a));
    assert!(texts.iter().any(|t| t.contains("Time's up")));
    assert!(texts.iter().any(|t| t.contains("passed their turn")));
}

/// Two turn changes back to back spawn two ticker tasks, but only the one
/// matching the latest timer generation may drive the countdown. A stale
/// ticker surviving alongside it would decrement twice per second and hit
/// zero mid-turn.
#[tokio::test(start_paused = true)]
async fn test_rapid_turn_changes_leave_a_single_countdown() {
    let state = Arc::new(AppState::new());
    let a = "player-a".to_string();
    let b = "player-b".to_string();
    let c = "player-c".to_string();
    let mut rx_a = connect(&state, &a).await;
    let mut rx_b = connect(&state, &b).await;
    let _rx_c = connect(&state, &c).await;

    let code = create_room(&state, &a, &mut rx_a, 1).await;
    for (id, name) in [(&b, "Bob"), (&c, "Cleo")] {
        handle_message(
            &state,
            id,
            ClientMessage::JoinRoom {
                name: name.to_string(),
                room_code: code.clone(),
            },
        )
        .await;
    }
    handle_message(
        &state,
        &a,
        ClientMessage::StartGame {
            room_code: code.clone(),
        },
    )
    .await;
    let candidates = secret_candidates(&state, &code).await;
    handle_message(
        &state,
        &a,
        ClientMessage::CharacterChosen {
            room_code: code.clone(),
            character_id: candidates[0].clone(),
        },
    )
    .await;

    // Two timer restarts with no time passing in between: B guesses wrong
    // (turn to C), C passes straight away (turn back to B)
    handle_message(
        &state,
        &b,
        ClientMessage::MakeGuess {
            room_code: code.clone(),
            character_id: candidates[7].clone(),
        },
    )
    .await;
    handle_message(
        &state,
        &c,
        ClientMessage::PassTurn {
            room_code: code.clone(),
        },
    )
    .await;

    tokio::time::sleep(std::time::Duration::from_millis(35_500)).await;

    let room = state.room(&code).await.unwrap();
    let room = room.lock().await;
    assert_eq!(
        room.turn_id.as_deref(),
        Some(b.as_str()),
        "the turn must not change before the full countdown elapses"
    );
    assert_eq!(room.time_left, 25, "exactly one ticker drives the clock");

    let broadcasts = system_texts(&drain(&mut rx_b));
    assert!(
        !broadcasts.iter().any(|t| t.contains("Time's up")),
        "no expiry within the 60-second window"
    );
}
