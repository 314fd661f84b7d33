use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type PlayerName = String;
pub type ConnectionId = String;
pub type TeamId = u32;
pub type Category = String;
pub type Price = u32;

/// Which screen the session is currently on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    #[default]
    Lobby,
    Board,
    Results,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub name: PlayerName,
    pub avatar: String,
    pub team: Option<TeamId>,
    pub is_admin: bool,
    pub is_ready: bool,
    pub connection: Option<ConnectionId>,
    /// Position in join order, assigned once on first join
    pub join_seq: u64,
}

impl Player {
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Team {
    pub id: TeamId,
    /// Member names in assignment order
    pub members: Vec<PlayerName>,
    pub score: u64,
}

/// One (category, price) slot on the board
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub category: Category,
    pub price: Price,
}

impl CellKey {
    pub fn new(category: impl Into<Category>, price: Price) -> Self {
        Self {
            category: category.into(),
            price,
        }
    }
}

/// The single in-flight question record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ActiveQuestion {
    #[default]
    Idle,
    Opened {
        category: Category,
        price: Price,
    },
    Contested {
        category: Category,
        price: Price,
        team: TeamId,
        /// Sequence number of the floor grant, used to spot stale timers
        claim: u64,
    },
}

impl ActiveQuestion {
    pub fn cell(&self) -> Option<CellKey> {
        match self {
            ActiveQuestion::Idle => None,
            ActiveQuestion::Opened { category, price }
            | ActiveQuestion::Contested {
                category, price, ..
            } => Some(CellKey::new(category.clone(), *price)),
        }
    }

    pub fn contesting_team(&self) -> Option<TeamId> {
        match self {
            ActiveQuestion::Contested { team, .. } => Some(*team),
            _ => None,
        }
    }

    pub fn claim(&self) -> Option<u64> {
        match self {
            ActiveQuestion::Contested { claim, .. } => Some(*claim),
            _ => None,
        }
    }
}

/// Human-facing identity of a team, derived from its members' avatars
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamIdentity {
    pub name: String,
    pub avatar: String,
}

pub const PLACEHOLDER_TEAM_NAME: &str = "Waiting for players";
pub const PLACEHOLDER_TEAM_AVATAR: &str = "placeholder.png";

/// Team names bound to the avatars shipped with the client
pub const AVATAR_TEAM_NAMES: &[(&str, &str)] = &[
    ("1.png", "Foxes"),
    ("2.png", "Owls"),
    ("3.png", "Bears"),
    ("4.png", "Wolves"),
    ("5.png", "Cats"),
    ("6.png", "Hares"),
    ("7.png", "Otters"),
    ("8.png", "Ravens"),
];

/// Resolve the team name bound to an avatar
pub fn team_name_for_avatar(avatar: &str) -> String {
    AVATAR_TEAM_NAMES
        .iter()
        .find(|(a, _)| *a == avatar)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| {
            let stem = avatar.rsplit_once('.').map_or(avatar, |(stem, _)| stem);
            format!("Team {}", stem)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_avatar_names() {
        assert_eq!(team_name_for_avatar("1.png"), "Foxes");
        assert_eq!(team_name_for_avatar("8.png"), "Ravens");
    }

    #[test]
    fn test_unknown_avatar_falls_back_to_stem() {
        assert_eq!(team_name_for_avatar("dragon.gif"), "Team dragon");
        assert_eq!(team_name_for_avatar("noext"), "Team noext");
    }

    #[test]
    fn test_active_question_accessors() {
        assert_eq!(ActiveQuestion::Idle.cell(), None);
        let contested = ActiveQuestion::Contested {
            category: "History".to_string(),
            price: 200,
            team: 3,
            claim: 1,
        };
        assert_eq!(contested.cell(), Some(CellKey::new("History", 200)));
        assert_eq!(contested.contesting_team(), Some(3));
    }
}
