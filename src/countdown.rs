//! Deferred countdown tasks
//!
//! A countdown never blocks event handling: it sleeps on its own task, then
//! takes the session lock and re-checks that the state it was started for
//! still holds. If anything moved on in the meantime it does nothing.

use crate::protocol::ServerMessage;
use crate::state::AppState;
use crate::types::{Stage, TeamId};
use std::sync::Arc;
use std::time::Duration;

/// Build a `TimerStart` message with an absolute deadline for clients
pub fn timer_start(team_id: Option<TeamId>, seconds: u64) -> ServerMessage {
    let deadline = chrono::Utc::now() + chrono::Duration::seconds(seconds as i64);
    ServerMessage::TimerStart {
        team_id,
        seconds,
        deadline: deadline.to_rfc3339(),
    }
}

/// Count down to the game start for the lobby epoch `epoch`
pub fn spawn_lobby_countdown(state: Arc<AppState>, epoch: u64) {
    let seconds = state.config.lobby_countdown_seconds;
    tracing::info!("Lobby countdown {} started: {}s", epoch, seconds);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(seconds)).await;
        finish_lobby_countdown(&state, epoch).await;
    });
}

async fn finish_lobby_countdown(state: &AppState, epoch: u64) {
    let mut session = state.session.lock().await;
    if !session.take_countdown(epoch) {
        tracing::debug!("Lobby countdown {} is stale, ignoring", epoch);
        return;
    }

    if session.lobby_ready(state.config.min_ready_players) {
        tracing::info!("Everyone is still ready, starting the game");
        session.force_start();
        state.broadcast_to_all(ServerMessage::RedirectTo {
            url: state.config.board_url.clone(),
        });
        state.sync_board(&session);
    } else {
        tracing::info!("Someone is no longer ready, start cancelled");
        state.broadcast_to_all(ServerMessage::TimerStop);
    }
}

/// Count down the answer time for floor claim `claim`
pub fn spawn_answer_countdown(state: Arc<AppState>, claim: u64) {
    let seconds = state.config.answer_seconds;
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(seconds)).await;
        finish_answer_countdown(&state, claim).await;
    });
}

async fn finish_answer_countdown(state: &AppState, claim: u64) {
    let session = state.session.lock().await;
    if session.stage != Stage::Board || session.board.active().claim() != Some(claim) {
        tracing::debug!("Answer countdown for claim {} is stale, ignoring", claim);
        return;
    }
    // The admin still judges the answer; clients only learn time is up
    tracing::info!(
        "Answer time for team {:?} is up",
        session.board.active().contesting_team()
    );
    state.broadcast_to_all(ServerMessage::TimerStop);
}
