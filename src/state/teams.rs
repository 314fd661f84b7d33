//! Team directory
//!
//! Teams only store ids, members and scores. Their display name and avatar
//! are derived from the members on every projection.

use super::roster::Roster;
use crate::error::{SessionError, SessionResult};
use crate::types::*;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct TeamDirectory {
    teams: BTreeMap<TeamId, Team>,
    last_id: TeamId,
}

impl TeamDirectory {
    /// Allocate an empty team with a fresh id
    pub fn create_team(&mut self) -> TeamId {
        self.last_id += 1;
        let id = self.last_id;
        self.teams.insert(
            id,
            Team {
                id,
                members: Vec::new(),
                score: 0,
            },
        );
        id
    }

    pub fn get(&self, id: TeamId) -> Option<&Team> {
        self.teams.get(&id)
    }

    pub fn contains(&self, id: TeamId) -> bool {
        self.teams.contains_key(&id)
    }

    /// Teams in id order
    pub fn iter(&self) -> impl Iterator<Item = &Team> {
        self.teams.values()
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn remove_member(&mut self, id: TeamId, name: &str) -> SessionResult<()> {
        let team = self
            .teams
            .get_mut(&id)
            .ok_or_else(|| SessionError::InconsistentState(format!("team {} does not exist", id)))?;
        team.members.retain(|m| m != name);
        Ok(())
    }

    pub fn add_member(&mut self, id: TeamId, name: &str) -> SessionResult<()> {
        let team = self
            .teams
            .get_mut(&id)
            .ok_or_else(|| SessionError::InconsistentState(format!("team {} does not exist", id)))?;
        if !team.members.iter().any(|m| m == name) {
            team.members.push(name.to_string());
        }
        Ok(())
    }

    pub fn adjust_score(&mut self, id: TeamId, delta: u64) -> SessionResult<()> {
        let team = self
            .teams
            .get_mut(&id)
            .ok_or_else(|| SessionError::InconsistentState(format!("cannot score unknown team {}", id)))?;
        team.score += delta;
        Ok(())
    }

    pub fn reset_scores(&mut self) {
        for team in self.teams.values_mut() {
            team.score = 0;
        }
    }
}

/// Derive a team's name and avatar by majority vote over the avatars of its
/// non-admin members. Ties go to the avatar seen first.
pub fn display_identity(team: &Team, roster: &Roster) -> TeamIdentity {
    let mut tally: Vec<(&str, usize)> = Vec::new();
    for player in team
        .members
        .iter()
        .filter_map(|name| roster.get(name))
        .filter(|p| !p.is_admin)
    {
        match tally.iter_mut().find(|(avatar, _)| *avatar == player.avatar) {
            Some((_, count)) => *count += 1,
            None => tally.push((player.avatar.as_str(), 1)),
        }
    }

    let mut winner: Option<(&str, usize)> = None;
    for (avatar, count) in tally {
        if winner.map_or(true, |(_, best)| count > best) {
            winner = Some((avatar, count));
        }
    }

    match winner {
        Some((avatar, _)) => TeamIdentity {
            name: team_name_for_avatar(avatar),
            avatar: avatar.to_string(),
        },
        None => TeamIdentity {
            name: PLACEHOLDER_TEAM_NAME.to_string(),
            avatar: PLACEHOLDER_TEAM_AVATAR.to_string(),
        },
    }
}
