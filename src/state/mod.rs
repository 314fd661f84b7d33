mod board;
mod roster;
mod session;
pub mod teams;

pub use board::{Board, FinishCheck, Resolution};
pub use roster::{select_next_admin, Roster};
pub use session::Session;
pub use teams::TeamDirectory;

use crate::config::AppConfig;
use crate::projection;
use crate::protocol::ServerMessage;
use crate::questions::QuestionBank;
use crate::types::ConnectionId;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

/// A message on its way to one or all connections
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Every connected client
    All(ServerMessage),
    /// Deliver a last message to one connection, then close it
    Close {
        connection: ConnectionId,
        msg: ServerMessage,
    },
}

impl Outbound {
    /// The message addressed to `connection`, and whether it should be closed
    /// afterwards
    pub fn for_connection(&self, connection: &ConnectionId) -> Option<(&ServerMessage, bool)> {
        match self {
            Outbound::All(msg) => Some((msg, false)),
            Outbound::Close { connection: c, msg } if c == connection => Some((msg, true)),
            _ => None,
        }
    }
}

/// Shared application state
pub struct AppState {
    pub session: Mutex<Session>,
    /// Fan-out channel every connection task subscribes to
    pub outbound: broadcast::Sender<Outbound>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig, bank: Arc<dyn QuestionBank>) -> Self {
        let (tx, _rx) = broadcast::channel(256);
        Self {
            session: Mutex::new(Session::new(bank)),
            outbound: tx,
            config,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Outbound> {
        self.outbound.subscribe()
    }

    // Send errors only mean nobody is connected right now

    pub fn broadcast_to_all(&self, msg: ServerMessage) {
        let _ = self.outbound.send(Outbound::All(msg));
    }

    pub fn close_connection(&self, connection: &ConnectionId, msg: ServerMessage) {
        let _ = self.outbound.send(Outbound::Close {
            connection: connection.clone(),
            msg,
        });
    }

    /// Push the projection matching the session's current stage
    pub fn sync(&self, session: &Session) {
        self.broadcast_to_all(projection::current_view(session));
    }

    pub fn sync_lobby(&self, session: &Session) {
        self.broadcast_to_all(ServerMessage::LobbyUpdate(projection::lobby_view(session)));
    }

    pub fn sync_board(&self, session: &Session) {
        self.broadcast_to_all(ServerMessage::BoardUpdate(projection::board_view(session)));
    }

    pub fn sync_results(&self, session: &Session) {
        self.broadcast_to_all(ServerMessage::ResultsUpdate(projection::results_view(session)));
    }
}
