//! Client-facing views of the session store
//!
//! Pure functions: they read the session and build an immutable payload.
//! Team display identities are recomputed on every call.

use crate::protocol::*;
use crate::state::teams::display_identity;
use crate::state::Session;
use crate::types::Stage;

fn admin_names(session: &Session) -> Vec<String> {
    session
        .roster
        .admins()
        .into_iter()
        .map(|p| p.name.clone())
        .collect()
}

fn standings(session: &Session) -> Vec<TeamStanding> {
    session
        .teams
        .iter()
        .map(|team| {
            let identity = display_identity(team, &session.roster);
            TeamStanding {
                id: team.id,
                name: identity.name,
                avatar: identity.avatar,
                score: team.score,
            }
        })
        .collect()
}

pub fn lobby_view(session: &Session) -> LobbyView {
    LobbyView {
        players: session
            .roster
            .in_join_order()
            .into_iter()
            .map(PlayerView::from)
            .collect(),
        teams: session.teams.iter().map(TeamSummary::from).collect(),
        admins: admin_names(session),
    }
}

pub fn board_view(session: &Session) -> BoardView {
    BoardView {
        teams: standings(session),
        admin_roster: session
            .roster
            .admins()
            .into_iter()
            .map(|p| AdminInfo {
                name: p.name.clone(),
                avatar: p.avatar.clone(),
            })
            .collect(),
        resolved: session.board.resolved().cloned().collect(),
        admins: admin_names(session),
        active: session.board.active().clone(),
    }
}

/// Standings sorted by score, highest first
pub fn results_view(session: &Session) -> ResultsView {
    let mut teams = standings(session);
    teams.sort_by(|a, b| b.score.cmp(&a.score).then(a.id.cmp(&b.id)));
    ResultsView {
        teams,
        admins: admin_names(session),
    }
}

/// The update message for whichever stage the session is in
pub fn current_view(session: &Session) -> ServerMessage {
    match session.stage {
        Stage::Lobby => ServerMessage::LobbyUpdate(lobby_view(session)),
        Stage::Board => ServerMessage::BoardUpdate(board_view(session)),
        Stage::Results => ServerMessage::ResultsUpdate(results_view(session)),
    }
}
