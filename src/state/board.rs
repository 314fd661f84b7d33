//! Board engine
//!
//! Holds the Active Question state machine and the set of resolved cells.
//!
//! ```text
//! Idle --open--> Opened --claim--> Contested --correct--> Idle
//!                  ^                   |
//!                  +----incorrect------+
//! ```
//!
//! Opening is allowed from every state so an admin can correct a mis-click.

use super::teams::TeamDirectory;
use crate::error::{SessionError, SessionResult};
use crate::questions::Catalog;
use crate::types::*;
use std::collections::BTreeSet;

#[derive(Debug, Default)]
pub struct Board {
    active: ActiveQuestion,
    resolved: BTreeSet<CellKey>,
    last_claim: u64,
    finished: bool,
}

/// Outcome of judging the contesting team's answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub team: TeamId,
    pub cell: CellKey,
    pub correct: bool,
    pub awarded: u64,
}

/// Outcome of an explicit finish check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishCheck {
    /// Every catalog cell is resolved
    pub complete: bool,
    /// This check is the one that set the finished flag
    pub newly_finished: bool,
}

impl Board {
    pub fn active(&self) -> &ActiveQuestion {
        &self.active
    }

    pub fn is_resolved(&self, cell: &CellKey) -> bool {
        self.resolved.contains(cell)
    }

    /// Resolved cells in (category, price) order
    pub fn resolved(&self) -> impl Iterator<Item = &CellKey> {
        self.resolved.iter()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Open a question, dropping any team that held the floor
    pub fn open(&mut self, cell: CellKey) {
        if self.active != ActiveQuestion::Idle {
            tracing::info!("Re-opening over active question {:?}", self.active);
        }
        self.active = ActiveQuestion::Opened {
            category: cell.category,
            price: cell.price,
        };
    }

    /// Give `team` the floor. Only legal while a question is opened and
    /// nobody holds the floor. Returns the claim sequence number.
    pub fn claim_floor(&mut self, team: TeamId) -> SessionResult<u64> {
        let ActiveQuestion::Opened { category, price } = &self.active else {
            return Err(SessionError::InconsistentState(format!(
                "team {} cannot claim the floor from {:?}",
                team, self.active
            )));
        };

        self.last_claim += 1;
        self.active = ActiveQuestion::Contested {
            category: category.clone(),
            price: *price,
            team,
            claim: self.last_claim,
        };
        Ok(self.last_claim)
    }

    /// Judge the contesting team's answer
    pub fn resolve(&mut self, correct: bool, teams: &mut TeamDirectory) -> SessionResult<Resolution> {
        let ActiveQuestion::Contested {
            category,
            price,
            team,
            ..
        } = &self.active
        else {
            return Err(SessionError::InconsistentState(format!(
                "no team holds the floor in {:?}",
                self.active
            )));
        };
        let cell = CellKey::new(category.clone(), *price);
        let team = *team;

        if !correct {
            self.active = ActiveQuestion::Opened {
                category: cell.category.clone(),
                price: cell.price,
            };
            return Ok(Resolution {
                team,
                cell,
                correct,
                awarded: 0,
            });
        }

        let awarded = u64::from(cell.price);
        if let Err(e) = teams.adjust_score(team, awarded) {
            tracing::warn!("Score not applied: {}", e);
        }
        self.resolved.insert(cell.clone());
        self.active = ActiveQuestion::Idle;

        Ok(Resolution {
            team,
            cell,
            correct,
            awarded,
        })
    }

    /// Flip a cell between open and resolved. Returns the new resolved state.
    pub fn toggle_cell(&mut self, cell: CellKey) -> bool {
        if self.resolved.remove(&cell) {
            false
        } else {
            self.resolved.insert(cell);
            true
        }
    }

    /// Compare resolved cells against the catalog and latch the finished flag
    pub fn check_finished(&mut self, catalog: &Catalog) -> FinishCheck {
        let resolved = self.resolved.iter().filter(|c| catalog.contains(c)).count();
        let total = catalog.total_questions();
        // An empty catalog never finishes
        let complete = total > 0 && resolved >= total;
        let newly_finished = complete && !self.finished;
        if newly_finished {
            self.finished = true;
        }
        FinishCheck {
            complete,
            newly_finished,
        }
    }

    /// Reopen every cell, zero scores, clear the active question and the
    /// finished flag. Team membership is untouched.
    pub fn restart(&mut self, teams: &mut TeamDirectory) {
        self.resolved.clear();
        self.active = ActiveQuestion::Idle;
        self.finished = false;
        teams.reset_scores();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::{CategoryQuestions, Question};

    fn catalog() -> Catalog {
        let question = |price| Question {
            price,
            prompt: format!("Q{}", price),
            media_type: Default::default(),
            media: None,
            answer: Default::default(),
        };
        Catalog {
            categories: vec![
                CategoryQuestions {
                    name: "History".to_string(),
                    questions: vec![question(100), question(200)],
                },
                CategoryQuestions {
                    name: "Music".to_string(),
                    questions: vec![question(100)],
                },
            ],
        }
    }

    fn contested(board: &mut Board, teams: &mut TeamDirectory) -> TeamId {
        let team = teams.create_team();
        board.open(CellKey::new("History", 200));
        board.claim_floor(team).unwrap();
        team
    }

    #[test]
    fn test_open_from_idle() {
        let mut board = Board::default();
        board.open(CellKey::new("History", 200));
        assert_eq!(
            board.active(),
            &ActiveQuestion::Opened {
                category: "History".to_string(),
                price: 200
            }
        );
    }

    #[test]
    fn test_reopen_clears_contesting_team() {
        let mut board = Board::default();
        let mut teams = TeamDirectory::default();
        contested(&mut board, &mut teams);

        board.open(CellKey::new("Music", 100));
        assert_eq!(board.active().contesting_team(), None);
        assert_eq!(board.active().cell(), Some(CellKey::new("Music", 100)));
    }

    #[test]
    fn test_claim_requires_opened() {
        let mut board = Board::default();
        assert!(matches!(
            board.claim_floor(1),
            Err(SessionError::InconsistentState(_))
        ));

        board.open(CellKey::new("History", 100));
        let first = board.claim_floor(1).unwrap();
        // Already contested
        assert!(board.claim_floor(2).is_err());
        assert_eq!(board.active().contesting_team(), Some(1));
        assert_eq!(board.active().claim(), Some(first));
    }

    #[test]
    fn test_correct_answer_scores_and_resolves() {
        let mut board = Board::default();
        let mut teams = TeamDirectory::default();
        let team = contested(&mut board, &mut teams);

        let resolution = board.resolve(true, &mut teams).unwrap();
        assert_eq!(resolution.awarded, 200);
        assert_eq!(resolution.team, team);
        assert_eq!(teams.get(team).unwrap().score, 200);
        assert!(board.is_resolved(&CellKey::new("History", 200)));
        assert_eq!(board.active(), &ActiveQuestion::Idle);
    }

    #[test]
    fn test_incorrect_answer_reopens_same_question() {
        let mut board = Board::default();
        let mut teams = TeamDirectory::default();
        let team = contested(&mut board, &mut teams);

        let resolution = board.resolve(false, &mut teams).unwrap();
        assert_eq!(resolution.awarded, 0);
        assert_eq!(teams.get(team).unwrap().score, 0);
        assert!(!board.is_resolved(&CellKey::new("History", 200)));
        assert_eq!(
            board.active(),
            &ActiveQuestion::Opened {
                category: "History".to_string(),
                price: 200
            }
        );

        // Another team may take the floor for the same question
        let other = teams.create_team();
        board.claim_floor(other).unwrap();
        assert_eq!(board.active().contesting_team(), Some(other));
    }

    #[test]
    fn test_resolve_requires_contested() {
        let mut board = Board::default();
        let mut teams = TeamDirectory::default();
        assert!(board.resolve(true, &mut teams).is_err());
        board.open(CellKey::new("History", 100));
        assert!(board.resolve(true, &mut teams).is_err());
    }

    #[test]
    fn test_claim_numbers_increase() {
        let mut board = Board::default();
        let mut teams = TeamDirectory::default();
        board.open(CellKey::new("History", 100));
        let first = board.claim_floor(1).unwrap();
        board.resolve(false, &mut teams).unwrap();
        let second = board.claim_floor(1).unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_toggle_cell() {
        let mut board = Board::default();
        let cell = CellKey::new("Music", 100);
        assert!(board.toggle_cell(cell.clone()));
        assert!(board.is_resolved(&cell));
        assert!(!board.toggle_cell(cell.clone()));
        assert!(!board.is_resolved(&cell));
    }

    #[test]
    fn test_check_finished_latches_once() {
        let mut board = Board::default();
        let catalog = catalog();
        board.toggle_cell(CellKey::new("History", 100));
        board.toggle_cell(CellKey::new("History", 200));
        // Cells outside the catalog do not count
        board.toggle_cell(CellKey::new("Sports", 100));

        let check = board.check_finished(&catalog);
        assert!(!check.complete);
        assert!(!board.is_finished());

        board.toggle_cell(CellKey::new("Music", 100));
        let check = board.check_finished(&catalog);
        assert!(check.complete && check.newly_finished);
        assert!(board.is_finished());

        let check = board.check_finished(&catalog);
        assert!(check.complete && !check.newly_finished);
    }

    #[test]
    fn test_restart_resets_everything_but_membership() {
        let mut board = Board::default();
        let mut teams = TeamDirectory::default();
        let team = contested(&mut board, &mut teams);
        teams.add_member(team, "Ann").unwrap();
        board.resolve(true, &mut teams).unwrap();
        board.toggle_cell(CellKey::new("History", 100));
        board.toggle_cell(CellKey::new("Music", 100));
        assert!(board.check_finished(&catalog()).newly_finished);

        board.restart(&mut teams);
        assert_eq!(board.resolved().count(), 0);
        assert_eq!(board.active(), &ActiveQuestion::Idle);
        assert!(!board.is_finished());
        assert_eq!(teams.get(team).unwrap().score, 0);
        assert_eq!(teams.get(team).unwrap().members, vec!["Ann"]);
        assert!(!board.check_finished(&catalog()).complete);
    }

    #[test]
    fn test_empty_catalog_never_finishes() {
        let mut board = Board::default();
        let check = board.check_finished(&Catalog::default());
        assert!(!check.complete);
        assert!(!board.is_finished());
    }
}
