//! Board handlers: questions, floor claims, judging and the game end

use crate::countdown;
use crate::error::SessionResult;
use crate::protocol::ServerMessage;
use crate::state::{AppState, Session};
use crate::types::{Price, Stage, TeamId};
use std::sync::Arc;

pub fn handle_open_question(
    state: &Arc<AppState>,
    session: &mut Session,
    category: &str,
    price: Price,
) -> SessionResult<Option<ServerMessage>> {
    // A running answer timer belongs to the question being replaced
    let was_contested = session.board.active().claim().is_some();

    let card = session.open_question(category, price);
    tracing::info!("Question opened: {} / {}", card.category, card.price);

    if was_contested {
        state.broadcast_to_all(ServerMessage::TimerStop);
    }
    state.broadcast_to_all(ServerMessage::QuestionOpened(card));
    state.sync_board(session);
    Ok(None)
}

pub fn handle_claim_floor(
    state: &Arc<AppState>,
    session: &mut Session,
    team: TeamId,
) -> SessionResult<Option<ServerMessage>> {
    let claim = session.claim_floor(team)?;
    tracing::info!("Team {} has the floor (claim {})", team, claim);

    state.broadcast_to_all(countdown::timer_start(
        Some(team),
        state.config.answer_seconds,
    ));
    state.sync_board(session);
    countdown::spawn_answer_countdown(state.clone(), claim);
    Ok(None)
}

pub fn handle_submit_answer(
    state: &Arc<AppState>,
    session: &mut Session,
    correct: bool,
) -> SessionResult<Option<ServerMessage>> {
    let resolution = session.submit_answer(correct)?;
    if resolution.correct {
        tracing::info!(
            "Team {} answered {} / {} correctly (+{})",
            resolution.team,
            resolution.cell.category,
            resolution.cell.price,
            resolution.awarded
        );
    } else {
        tracing::info!(
            "Team {} missed {} / {}, floor is open again",
            resolution.team,
            resolution.cell.category,
            resolution.cell.price
        );
    }

    state.broadcast_to_all(ServerMessage::TimerStop);
    state.sync_board(session);
    Ok(None)
}

pub fn handle_toggle_cell(
    state: &Arc<AppState>,
    session: &mut Session,
    category: &str,
    price: Price,
) -> SessionResult<Option<ServerMessage>> {
    let resolved = session.toggle_cell(category, price)?;
    tracing::info!("Cell {} / {} resolved={}", category, price, resolved);
    state.sync_board(session);
    Ok(None)
}

pub fn handle_check_finished(
    state: &Arc<AppState>,
    session: &mut Session,
) -> SessionResult<Option<ServerMessage>> {
    let check = session.check_finished();
    if check.newly_finished {
        state.broadcast_to_all(ServerMessage::GameFinished {
            url: state.config.results_url.clone(),
        });
        state.sync_results(session);
    }
    Ok(None)
}

pub fn handle_restart(
    state: &Arc<AppState>,
    session: &mut Session,
) -> SessionResult<Option<ServerMessage>> {
    let previous = session.stage;
    let was_contested = session.board.active().claim().is_some();
    session.restart();

    if was_contested {
        state.broadcast_to_all(ServerMessage::TimerStop);
    }
    if previous != Stage::Board {
        state.broadcast_to_all(ServerMessage::RedirectTo {
            url: state.config.board_url.clone(),
        });
    }
    state.sync_board(session);
    Ok(None)
}
