use crate::questions::{AnswerContent, MediaType, Question};
use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    Join {
        #[serde(default)]
        name: String,
        #[serde(default)]
        avatar: String,
    },
    ToggleReady,
    // Admin-only messages
    Kick {
        target_id: ConnectionId,
    },
    ForceStart,
    CreateTeam,
    AssignToTeam {
        player: PlayerName,
        team_id: Option<TeamId>,
    },
    MakeAdmin {
        player: PlayerName,
    },
    OpenQuestion {
        category: Category,
        price: Price,
    },
    ToggleCell {
        category: Category,
        price: Price,
    },
    ClaimFloor {
        team_id: TeamId,
    },
    SubmitAnswer {
        correct: bool,
    },
    CheckFinished,
    Restart,
    GoToLobby,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once when a socket connects
    Welcome {
        connection_id: ConnectionId,
        stage: Stage,
        server_now: String,
    },
    /// Reply to the joining connection
    Joined {
        player: PlayerView,
    },
    LobbyUpdate(LobbyView),
    BoardUpdate(BoardView),
    ResultsUpdate(ResultsView),
    QuestionOpened(QuestionCard),
    /// `team_id` is empty for the lobby start countdown
    TimerStart {
        team_id: Option<TeamId>,
        seconds: u64,
        deadline: String,
    },
    TimerStop,
    RedirectTo {
        url: String,
    },
    GameFinished {
        url: String,
    },
}

/// Per-player row of the lobby
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerView {
    pub name: PlayerName,
    pub avatar: String,
    pub team: Option<TeamId>,
    pub is_admin: bool,
    pub is_ready: bool,
    pub connected: bool,
    /// Live connection, the handle admins kick by
    pub connection_id: Option<ConnectionId>,
}

impl From<&Player> for PlayerView {
    fn from(p: &Player) -> Self {
        Self {
            name: p.name.clone(),
            avatar: p.avatar.clone(),
            team: p.team,
            is_admin: p.is_admin,
            is_ready: p.is_ready,
            connected: p.is_connected(),
            connection_id: p.connection.clone(),
        }
    }
}

/// Team membership as shown in the lobby (no display identity)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamSummary {
    pub id: TeamId,
    pub members: Vec<PlayerName>,
    pub score: u64,
}

impl From<&Team> for TeamSummary {
    fn from(t: &Team) -> Self {
        Self {
            id: t.id,
            members: t.members.clone(),
            score: t.score,
        }
    }
}

/// Team with its derived display identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamStanding {
    pub id: TeamId,
    pub name: String,
    pub avatar: String,
    pub score: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminInfo {
    pub name: PlayerName,
    pub avatar: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LobbyView {
    pub players: Vec<PlayerView>,
    pub teams: Vec<TeamSummary>,
    pub admins: Vec<PlayerName>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoardView {
    pub teams: Vec<TeamStanding>,
    pub admin_roster: Vec<AdminInfo>,
    pub resolved: Vec<CellKey>,
    pub admins: Vec<PlayerName>,
    /// Lets clients that connect mid-question catch up
    pub active: ActiveQuestion,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultsView {
    pub teams: Vec<TeamStanding>,
    pub admins: Vec<PlayerName>,
}

/// Full content of an opened question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionCard {
    pub category: Category,
    pub price: Price,
    pub prompt: String,
    pub media_type: MediaType,
    pub media: Option<String>,
    pub answer: AnswerContent,
}

impl QuestionCard {
    pub fn new(cell: CellKey, question: &Question) -> Self {
        Self {
            category: cell.category,
            price: cell.price,
            prompt: question.prompt.clone(),
            media_type: question.media_type,
            media: question.media.clone(),
            answer: question.answer.clone(),
        }
    }

    /// Empty card used when the bank has no such question
    pub fn placeholder(cell: CellKey) -> Self {
        Self {
            category: cell.category,
            price: cell.price,
            prompt: String::new(),
            media_type: MediaType::Text,
            media: None,
            answer: AnswerContent::default(),
        }
    }
}
