//! Roster and connection registry
//!
//! Players are keyed by display name. The registry maps each live connection
//! back to the name it joined under, so a reconnect under the same name just
//! rebinds the handle and a late disconnect from the old socket is ignored.

use crate::error::{SessionError, SessionResult};
use crate::types::*;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct Roster {
    players: HashMap<PlayerName, Player>,
    connections: HashMap<ConnectionId, PlayerName>,
    next_join_seq: u64,
}

/// Pick the earliest-joined player among the candidates.
pub fn select_next_admin<'a>(candidates: impl IntoIterator<Item = &'a Player>) -> Option<PlayerName> {
    candidates
        .into_iter()
        .min_by_key(|p| p.join_seq)
        .map(|p| p.name.clone())
}

impl Roster {
    /// Add a player or rebind an existing one to `connection`
    pub fn join(&mut self, name: &str, avatar: &str, connection: ConnectionId) -> SessionResult<&Player> {
        let name = name.trim();
        let avatar = avatar.trim();
        if name.is_empty() || avatar.is_empty() {
            return Err(SessionError::InvalidJoin);
        }

        // A connection speaks for one player at a time
        if let Some(previous) = self.connections.get(&connection).cloned() {
            if previous != name {
                tracing::info!("Connection {} switches from '{}' to '{}'", connection, previous, name);
                self.detach(&connection);
            }
        }

        if let Some(player) = self.players.get_mut(name) {
            if let Some(old) = player.connection.replace(connection.clone()) {
                if old != connection {
                    tracing::info!("Player '{}' reconnected, replacing connection {}", name, old);
                }
                self.connections.remove(&old);
            }
            player.avatar = avatar.to_string();
        } else {
            let join_seq = self.next_join_seq;
            self.next_join_seq += 1;
            self.players.insert(
                name.to_string(),
                Player {
                    name: name.to_string(),
                    avatar: avatar.to_string(),
                    team: None,
                    is_admin: false,
                    is_ready: false,
                    connection: Some(connection.clone()),
                    join_seq,
                },
            );
            tracing::info!("Player '{}' joined. Players: {}", name, self.players.len());
        }

        self.connections.insert(connection, name.to_string());
        self.players
            .get(name)
            .ok_or_else(|| SessionError::InconsistentState(format!("player '{}' vanished during join", name)))
    }

    /// Detach the player bound to `connection`, keeping its record.
    ///
    /// Returns the affected player's name; unknown or replaced connections
    /// return `None`.
    pub fn detach(&mut self, connection: &ConnectionId) -> Option<PlayerName> {
        let name = self.connections.remove(connection)?;
        let player = self.players.get_mut(&name)?;
        if player.connection.as_ref() != Some(connection) {
            return None;
        }
        player.connection = None;
        player.is_ready = false;
        Some(name)
    }

    /// Drop a player record entirely
    pub fn remove(&mut self, name: &str) -> Option<Player> {
        let player = self.players.remove(name)?;
        if let Some(connection) = &player.connection {
            self.connections.remove(connection);
        }
        Some(player)
    }

    pub fn get(&self, name: &str) -> Option<&Player> {
        self.players.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Player> {
        self.players.get_mut(name)
    }

    pub fn by_connection(&self, connection: &ConnectionId) -> Option<&Player> {
        self.connections
            .get(connection)
            .and_then(|name| self.players.get(name))
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// All players, earliest joiner first
    pub fn in_join_order(&self) -> Vec<&Player> {
        let mut players: Vec<&Player> = self.players.values().collect();
        players.sort_by_key(|p| p.join_seq);
        players
    }

    pub fn connected(&self) -> impl Iterator<Item = &Player> {
        self.players.values().filter(|p| p.is_connected())
    }

    /// Admins in join order
    pub fn admins(&self) -> Vec<&Player> {
        self.in_join_order()
            .into_iter()
            .filter(|p| p.is_admin)
            .collect()
    }

    /// The player who should be promoted, if connected players exist but
    /// none of them is an admin.
    pub fn admin_vacancy(&self) -> Option<PlayerName> {
        if self.connected().any(|p| p.is_admin) {
            return None;
        }
        select_next_admin(self.connected())
    }

    /// Whether enough players are connected and every one of them is ready
    pub fn all_ready(&self, min_players: usize) -> bool {
        let connected: Vec<&Player> = self.connected().collect();
        connected.len() >= min_players && connected.iter().all(|p| p.is_ready)
    }

    pub fn clear_ready(&mut self) {
        for player in self.players.values_mut() {
            player.is_ready = false;
        }
    }
}
