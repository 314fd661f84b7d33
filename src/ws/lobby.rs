//! Lobby, roster and team handlers
//!
//! Admin checks happen in the dispatch layer before these are called.

use crate::countdown;
use crate::error::{SessionError, SessionResult};
use crate::protocol::{PlayerView, ServerMessage};
use crate::state::{AppState, Session};
use crate::types::{ConnectionId, PlayerName, Stage, TeamId};
use std::sync::Arc;

/// Stop a running start countdown once the lobby is no longer ready
pub fn cancel_countdown_if_unready(state: &AppState, session: &mut Session) {
    if session.countdown_pending() && !session.lobby_ready(state.config.min_ready_players) {
        session.stop_countdown();
        state.broadcast_to_all(ServerMessage::TimerStop);
    }
}

pub fn handle_join(
    state: &Arc<AppState>,
    session: &mut Session,
    connection: &ConnectionId,
    name: &str,
    avatar: &str,
) -> SessionResult<Option<ServerMessage>> {
    let player = session.join(name, avatar, connection.clone())?;
    cancel_countdown_if_unready(state, session);
    state.sync(session);
    Ok(Some(ServerMessage::Joined {
        player: PlayerView::from(&player),
    }))
}

pub fn handle_toggle_ready(
    state: &Arc<AppState>,
    session: &mut Session,
    connection: &ConnectionId,
) -> SessionResult<Option<ServerMessage>> {
    if session.stage != Stage::Lobby {
        return Err(SessionError::InconsistentState(format!(
            "ready toggled outside the lobby ({:?})",
            session.stage
        )));
    }
    let ready = session.toggle_ready(connection)?;
    tracing::debug!("Connection {} ready={}", connection, ready);

    if session.lobby_ready(state.config.min_ready_players) {
        let epoch = session.start_countdown();
        state.broadcast_to_all(countdown::timer_start(
            None,
            state.config.lobby_countdown_seconds,
        ));
        countdown::spawn_lobby_countdown(state.clone(), epoch);
    } else if session.stop_countdown() {
        state.broadcast_to_all(ServerMessage::TimerStop);
    }

    state.sync(session);
    Ok(None)
}

pub fn handle_kick(
    state: &Arc<AppState>,
    session: &mut Session,
    connection: &ConnectionId,
    target: &ConnectionId,
) -> SessionResult<Option<ServerMessage>> {
    if target == connection {
        return Err(SessionError::Unauthorized("kick themselves"));
    }
    let kicked = session.kick(target)?;
    tracing::info!("Admin on {} kicked '{}'", connection, kicked.name);

    state.close_connection(
        target,
        ServerMessage::RedirectTo {
            url: state.config.index_url.clone(),
        },
    );
    cancel_countdown_if_unready(state, session);
    state.sync(session);
    Ok(None)
}

pub fn handle_force_start(
    state: &Arc<AppState>,
    session: &mut Session,
) -> SessionResult<Option<ServerMessage>> {
    tracing::info!("Admin forced the game start");
    session.force_start();
    state.broadcast_to_all(ServerMessage::RedirectTo {
        url: state.config.board_url.clone(),
    });
    state.sync_board(session);
    Ok(None)
}

pub fn handle_go_to_lobby(
    state: &Arc<AppState>,
    session: &mut Session,
) -> SessionResult<Option<ServerMessage>> {
    tracing::info!("Admin sent everyone back to the lobby");
    let was_contested = session.board.active().claim().is_some();
    session.go_to_lobby();
    if was_contested {
        state.broadcast_to_all(ServerMessage::TimerStop);
    }
    state.broadcast_to_all(ServerMessage::RedirectTo {
        url: state.config.lobby_url.clone(),
    });
    state.sync_lobby(session);
    Ok(None)
}

pub fn handle_create_team(
    state: &Arc<AppState>,
    session: &mut Session,
) -> SessionResult<Option<ServerMessage>> {
    session.create_team();
    state.sync(session);
    Ok(None)
}

pub fn handle_assign(
    state: &Arc<AppState>,
    session: &mut Session,
    player: &PlayerName,
    team: Option<TeamId>,
) -> SessionResult<Option<ServerMessage>> {
    session.assign(player, team)?;
    tracing::info!("Player '{}' assigned to team {:?}", player, team);
    state.sync(session);
    Ok(None)
}

pub fn handle_make_admin(
    state: &Arc<AppState>,
    session: &mut Session,
    player: &PlayerName,
) -> SessionResult<Option<ServerMessage>> {
    if !session.grant_admin(player) {
        return Err(SessionError::InconsistentState(format!(
            "unknown player '{}'",
            player
        )));
    }
    tracing::info!("Player '{}' is now an admin", player);
    state.sync(session);
    Ok(None)
}
