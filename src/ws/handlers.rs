//! WebSocket message dispatch
//!
//! This module is the session coordinator's entry point. It takes the session
//! lock, checks authorization, dispatches to the lobby or game handlers and
//! swallows every error so nothing crosses the event boundary.

use crate::error::{SessionError, SessionResult};
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::{AppState, Session};
use crate::types::ConnectionId;
use std::sync::Arc;

use super::{game, lobby};

/// Macro to drop the event early unless the caller is an admin
macro_rules! require_admin {
    ($is_admin:expr, $action:expr) => {
        if !$is_admin {
            return Err(SessionError::Unauthorized($action));
        }
    };
}

/// Handle one client message to completion and return an optional reply for
/// the sender
pub async fn handle_message(
    connection: &ConnectionId,
    msg: ClientMessage,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    let mut session = state.session.lock().await;
    match dispatch(connection, msg, state, &mut session) {
        Ok(reply) => reply,
        Err(e) => {
            match &e {
                SessionError::Unauthorized(_) => {
                    tracing::debug!("Dropped event from {}: {}", connection, e)
                }
                SessionError::InvalidJoin => {
                    tracing::warn!("Dropped join from {}: {}", connection, e)
                }
                SessionError::InconsistentState(_) | SessionError::ContentLookupFailure { .. } => {
                    tracing::warn!("Event from {} ignored: {}", connection, e)
                }
            }
            None
        }
    }
}

fn dispatch(
    connection: &ConnectionId,
    msg: ClientMessage,
    state: &Arc<AppState>,
    session: &mut Session,
) -> SessionResult<Option<ServerMessage>> {
    // Everything but join needs a player behind the connection
    let is_admin = match (&msg, session.player_for(connection)) {
        (ClientMessage::Join { .. }, _) => false,
        (_, Some(player)) => player.is_admin,
        (_, None) => {
            return Err(SessionError::InconsistentState(format!(
                "connection {} has not joined",
                connection
            )))
        }
    };

    match msg {
        ClientMessage::Join { name, avatar } => {
            lobby::handle_join(state, session, connection, &name, &avatar)
        }

        ClientMessage::ToggleReady => lobby::handle_toggle_ready(state, session, connection),

        ClientMessage::CheckFinished => game::handle_check_finished(state, session),

        // Admin-only commands
        ClientMessage::Kick { target_id } => {
            require_admin!(is_admin, "kick players");
            lobby::handle_kick(state, session, connection, &target_id)
        }

        ClientMessage::ForceStart => {
            require_admin!(is_admin, "force the start");
            lobby::handle_force_start(state, session)
        }

        ClientMessage::GoToLobby => {
            require_admin!(is_admin, "return to the lobby");
            lobby::handle_go_to_lobby(state, session)
        }

        ClientMessage::CreateTeam => {
            require_admin!(is_admin, "create teams");
            lobby::handle_create_team(state, session)
        }

        ClientMessage::AssignToTeam { player, team_id } => {
            require_admin!(is_admin, "assign teams");
            lobby::handle_assign(state, session, &player, team_id)
        }

        ClientMessage::MakeAdmin { player } => {
            require_admin!(is_admin, "grant admin");
            lobby::handle_make_admin(state, session, &player)
        }

        ClientMessage::OpenQuestion { category, price } => {
            require_admin!(is_admin, "open questions");
            game::handle_open_question(state, session, &category, price)
        }

        ClientMessage::ToggleCell { category, price } => {
            require_admin!(is_admin, "toggle cells");
            game::handle_toggle_cell(state, session, &category, price)
        }

        ClientMessage::ClaimFloor { team_id } => {
            require_admin!(is_admin, "give a team the floor");
            game::handle_claim_floor(state, session, team_id)
        }

        ClientMessage::SubmitAnswer { correct } => {
            require_admin!(is_admin, "judge answers");
            game::handle_submit_answer(state, session, correct)
        }

        ClientMessage::Restart => {
            require_admin!(is_admin, "restart the game");
            game::handle_restart(state, session)
        }
    }
}

/// Clean up after a closed socket
pub async fn handle_disconnect(connection: &ConnectionId, state: &Arc<AppState>) {
    let mut session = state.session.lock().await;
    if session.disconnect(connection).is_none() {
        return;
    }
    lobby::cancel_countdown_if_unready(state, &mut session);
    state.sync(&session);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::questions::StaticQuestionBank;
    use crate::state::Outbound;
    use tokio::sync::broadcast::error::TryRecvError;

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(
            AppConfig::default(),
            Arc::new(StaticQuestionBank::default()),
        ))
    }

    async fn join(state: &Arc<AppState>, connection: &str, name: &str) {
        handle_message(
            &connection.to_string(),
            ClientMessage::Join {
                name: name.to_string(),
                avatar: "1.png".to_string(),
            },
            state,
        )
        .await;
    }

    #[tokio::test]
    async fn test_non_admin_command_is_dropped_silently() {
        let state = state();
        join(&state, "a", "Ann").await;
        join(&state, "b", "Bob").await;
        let mut rx = state.subscribe();

        let reply = handle_message(&"b".to_string(), ClientMessage::CreateTeam, &state).await;

        assert!(reply.is_none());
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        assert!(state.session.lock().await.teams.is_empty());
    }

    #[tokio::test]
    async fn test_events_before_join_are_dropped() {
        let state = state();
        let mut rx = state.subscribe();

        let reply = handle_message(&"x".to_string(), ClientMessage::ToggleReady, &state).await;

        assert!(reply.is_none());
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_admin_command_is_applied() {
        let state = state();
        join(&state, "a", "Ann").await;
        let mut rx = state.subscribe();

        handle_message(&"a".to_string(), ClientMessage::CreateTeam, &state).await;

        assert_eq!(state.session.lock().await.teams.len(), 1);
        assert!(matches!(
            rx.recv().await.unwrap(),
            Outbound::All(ServerMessage::LobbyUpdate(_))
        ));
    }

    #[tokio::test]
    async fn test_disconnect_of_unknown_connection_is_silent() {
        let state = state();
        let mut rx = state.subscribe();
        handle_disconnect(&"ghost".to_string(), &state).await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_disconnect_broadcasts_and_promotes() {
        let state = state();
        join(&state, "a", "Ann").await;
        join(&state, "b", "Bob").await;
        let mut rx = state.subscribe();

        handle_disconnect(&"a".to_string(), &state).await;

        match rx.recv().await.unwrap() {
            Outbound::All(ServerMessage::LobbyUpdate(view)) => {
                assert!(view.admins.contains(&"Bob".to_string()));
                let ann = view.players.iter().find(|p| p.name == "Ann").unwrap();
                assert!(!ann.connected);
            }
            other => panic!("Expected LobbyUpdate, got {:?}", other),
        }
    }
}
