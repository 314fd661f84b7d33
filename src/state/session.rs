use super::board::{Board, FinishCheck, Resolution};
use super::roster::Roster;
use super::teams::TeamDirectory;
use crate::error::{SessionError, SessionResult};
use crate::protocol::QuestionCard;
use crate::questions::{Question, QuestionBank};
use crate::types::*;
use std::sync::Arc;

/// The single owned session store.
///
/// Every method runs to completion without suspending; callers hold the
/// session lock for the mutation and the broadcast that follows it.
pub struct Session {
    pub roster: Roster,
    pub teams: TeamDirectory,
    pub board: Board,
    pub stage: Stage,
    /// Bumped whenever the lobby start countdown is started or stopped
    countdown_epoch: u64,
    /// Epoch of the countdown currently running, if any
    pending_countdown: Option<u64>,
    bank: Arc<dyn QuestionBank>,
}

impl Session {
    pub fn new(bank: Arc<dyn QuestionBank>) -> Self {
        Self {
            roster: Roster::default(),
            teams: TeamDirectory::default(),
            board: Board::default(),
            stage: Stage::Lobby,
            countdown_epoch: 0,
            pending_countdown: None,
            bank,
        }
    }

    pub fn player_for(&self, connection: &ConnectionId) -> Option<&Player> {
        self.roster.by_connection(connection)
    }

    // ========== Roster ==========

    pub fn join(&mut self, name: &str, avatar: &str, connection: ConnectionId) -> SessionResult<Player> {
        let name = self.roster.join(name, avatar, connection)?.name.clone();
        self.fill_admin_vacancy();
        self.roster
            .get(&name)
            .cloned()
            .ok_or_else(|| SessionError::InconsistentState(format!("player '{}' missing after join", name)))
    }

    /// Detach the player behind `connection`. Returns its name when the
    /// connection was still the player's live one.
    pub fn disconnect(&mut self, connection: &ConnectionId) -> Option<PlayerName> {
        let name = self.roster.detach(connection)?;
        tracing::info!("Player '{}' disconnected", name);
        self.fill_admin_vacancy();
        Some(name)
    }

    /// Remove the player behind `target` entirely
    pub fn kick(&mut self, target: &ConnectionId) -> SessionResult<Player> {
        let name = self
            .player_for(target)
            .map(|p| p.name.clone())
            .ok_or_else(|| SessionError::InconsistentState(format!("no player on connection {}", target)))?;
        let player = self
            .roster
            .remove(&name)
            .ok_or_else(|| SessionError::InconsistentState(format!("player '{}' vanished", name)))?;
        if let Some(team) = player.team {
            if let Err(e) = self.teams.remove_member(team, &name) {
                tracing::warn!("Kicked player '{}' had a stale team: {}", name, e);
            }
        }
        tracing::info!("Player '{}' kicked. Players: {}", name, self.roster.len());
        self.fill_admin_vacancy();
        Ok(player)
    }

    /// Promote the earliest-joined connected player when no connected admin
    /// is left
    fn fill_admin_vacancy(&mut self) {
        if let Some(name) = self.roster.admin_vacancy() {
            tracing::info!("Promoting '{}' to admin", name);
            self.grant_admin(&name);
        }
    }

    /// Make a player admin. Admins cannot hold a team slot.
    pub fn grant_admin(&mut self, name: &str) -> bool {
        let Some(player) = self.roster.get_mut(name) else {
            return false;
        };
        player.is_admin = true;
        if let Err(e) = self.assign(name, None) {
            tracing::warn!("Could not clear team of new admin '{}': {}", name, e);
        }
        true
    }

    /// Flip the caller's ready flag. Returns the new flag.
    pub fn toggle_ready(&mut self, connection: &ConnectionId) -> SessionResult<bool> {
        let name = self
            .player_for(connection)
            .map(|p| p.name.clone())
            .ok_or_else(|| SessionError::InconsistentState(format!("no player on connection {}", connection)))?;
        let player = self
            .roster
            .get_mut(&name)
            .ok_or_else(|| SessionError::InconsistentState(format!("player '{}' missing", name)))?;
        player.is_ready = !player.is_ready;
        Ok(player.is_ready)
    }

    // ========== Lobby countdown ==========

    /// Whether the lobby may count down to the game
    pub fn lobby_ready(&self, min_players: usize) -> bool {
        self.stage == Stage::Lobby && self.roster.all_ready(min_players)
    }

    /// Start a new countdown, superseding any running one. Returns its epoch.
    pub fn start_countdown(&mut self) -> u64 {
        self.countdown_epoch += 1;
        self.pending_countdown = Some(self.countdown_epoch);
        self.countdown_epoch
    }

    /// Cancel the running countdown. Returns whether one was running.
    pub fn stop_countdown(&mut self) -> bool {
        self.countdown_epoch += 1;
        self.pending_countdown.take().is_some()
    }

    /// Claim the countdown started at `epoch` when its timer fires. Stale
    /// epochs yield `false` and leave everything untouched.
    pub fn take_countdown(&mut self, epoch: u64) -> bool {
        if self.pending_countdown == Some(epoch) {
            self.pending_countdown = None;
            true
        } else {
            false
        }
    }

    pub fn countdown_pending(&self) -> bool {
        self.pending_countdown.is_some()
    }

    // ========== Stages ==========

    pub fn force_start(&mut self) {
        self.pending_countdown = None;
        self.stage = Stage::Board;
    }

    pub fn go_to_lobby(&mut self) {
        self.pending_countdown = None;
        self.roster.clear_ready();
        self.stage = Stage::Lobby;
    }

    // ========== Teams ==========

    pub fn create_team(&mut self) -> TeamId {
        let id = self.teams.create_team();
        tracing::info!("Team {} created", id);
        id
    }

    /// Move a player to `team`, or out of any team for `None`
    pub fn assign(&mut self, name: &str, team: Option<TeamId>) -> SessionResult<()> {
        let player = self
            .roster
            .get(name)
            .ok_or_else(|| SessionError::InconsistentState(format!("unknown player '{}'", name)))?;

        if let Some(team) = team {
            if !self.teams.contains(team) {
                return Err(SessionError::InconsistentState(format!("team {} does not exist", team)));
            }
            if player.is_admin {
                return Err(SessionError::InconsistentState(format!(
                    "admin '{}' cannot join team {}",
                    name, team
                )));
            }
        }

        if let Some(old) = player.team {
            if let Err(e) = self.teams.remove_member(old, name) {
                tracing::warn!("Removing '{}' from old team: {}", name, e);
            }
        }
        if let Some(team) = team {
            self.teams.add_member(team, name)?;
        }
        if let Some(player) = self.roster.get_mut(name) {
            player.team = team;
        }
        Ok(())
    }

    // ========== Board ==========

    fn lookup(&self, cell: &CellKey) -> SessionResult<Question> {
        let missing = || SessionError::ContentLookupFailure {
            category: cell.category.clone(),
            price: cell.price,
        };
        let catalog = self.bank.catalog().map_err(|e| {
            tracing::error!("Question bank unavailable: {}", e);
            missing()
        })?;
        catalog.find(&cell.category, cell.price).cloned().ok_or_else(missing)
    }

    /// Open a question and resolve its content. A bank miss still opens the
    /// question, with a placeholder card.
    pub fn open_question(&mut self, category: &str, price: Price) -> QuestionCard {
        let cell = CellKey::new(category, price);
        self.board.open(cell.clone());
        match self.lookup(&cell) {
            Ok(question) => QuestionCard::new(cell, &question),
            Err(e) => {
                tracing::warn!("Opening with placeholder content: {}", e);
                QuestionCard::placeholder(cell)
            }
        }
    }

    pub fn claim_floor(&mut self, team: TeamId) -> SessionResult<u64> {
        if !self.teams.contains(team) {
            return Err(SessionError::InconsistentState(format!("team {} does not exist", team)));
        }
        self.board.claim_floor(team)
    }

    pub fn submit_answer(&mut self, correct: bool) -> SessionResult<Resolution> {
        self.board.resolve(correct, &mut self.teams)
    }

    /// Flip a catalog cell. Returns the new resolved state.
    pub fn toggle_cell(&mut self, category: &str, price: Price) -> SessionResult<bool> {
        let cell = CellKey::new(category, price);
        let catalog = self
            .bank
            .catalog()
            .map_err(|e| SessionError::InconsistentState(format!("question bank unavailable: {}", e)))?;
        if !catalog.contains(&cell) {
            return Err(SessionError::InconsistentState(format!(
                "no cell {} / {} on the board",
                category, price
            )));
        }
        Ok(self.board.toggle_cell(cell))
    }

    /// Check whether the board is exhausted; entering Results on the first hit
    pub fn check_finished(&mut self) -> FinishCheck {
        let catalog = match self.bank.catalog() {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("Cannot check for game end: {}", e);
                return FinishCheck {
                    complete: false,
                    newly_finished: false,
                };
            }
        };
        let check = self.board.check_finished(&catalog);
        if check.newly_finished {
            tracing::info!("All questions resolved, game finished");
            self.stage = Stage::Results;
        }
        check
    }

    pub fn restart(&mut self) {
        self.board.restart(&mut self.teams);
        self.stage = Stage::Board;
        tracing::info!("Game restarted");
    }
}
