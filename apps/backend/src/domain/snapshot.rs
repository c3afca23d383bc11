//! Public views of invites and matches, flattened for clients.
//!
//! A view is also what a rejected operation returns so the caller can
//! resynchronize: phase, turn holder and vote tally are always present.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::ids::{InviteId, MatchId, PlayerId, VenueId};
use crate::domain::invite::{Invite, InviteStatus, ResponseState};
use crate::domain::match_state::{Match, Phase, PhaseKind};
use crate::domain::player::PlayerSnapshot;
use crate::domain::vote::{Outcome, Tally, VotePolicy};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InviteView {
    pub id: InviteId,
    pub version: i64,
    pub venue_id: VenueId,
    pub creator_id: PlayerId,
    pub participants: Vec<PlayerSnapshot>,
    pub responses: BTreeMap<PlayerId, ResponseState>,
    /// Effective status at the time the view was taken.
    pub status: InviteStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    pub match_id: Option<MatchId>,
}

impl InviteView {
    pub fn of(invite: &Invite, version: i64, now: OffsetDateTime) -> Self {
        Self {
            id: invite.id.clone(),
            version,
            venue_id: invite.venue_id.clone(),
            creator_id: invite.creator_id.clone(),
            participants: invite.participants.clone(),
            responses: invite.responses.clone(),
            status: invite.effective_status(now),
            created_at: invite.created_at,
            expires_at: invite.expires_at,
            match_id: invite.match_id.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerPublic {
    pub id: PlayerId,
    pub name: String,
    pub letters: String,
    pub eliminated: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoteView {
    pub eligible_voter_ids: Vec<PlayerId>,
    pub ballots: BTreeMap<PlayerId, Outcome>,
    pub tally: Tally,
    pub policy: VotePolicy,
    pub claimed: Outcome,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchView {
    pub id: MatchId,
    pub version: i64,
    pub invite_id: InviteId,
    pub venue_id: VenueId,
    pub phase: PhaseKind,
    pub players: Vec<PlayerPublic>,
    pub current_turn_player_id: Option<PlayerId>,
    pub current_trick: Option<String>,
    pub trick_is_established: bool,
    pub originator_id: Option<PlayerId>,
    pub executor_id: Option<PlayerId>,
    pub vote: Option<VoteView>,
    pub established_tricks: Vec<String>,
    pub attempted_tricks: Vec<String>,
    pub eliminated_ids: Vec<PlayerId>,
    pub winner_id: Option<PlayerId>,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub finished_at: Option<OffsetDateTime>,
}

impl MatchView {
    pub fn of(m: &Match, version: i64) -> Self {
        let attempt = m.phase.attempt();
        let vote = match &m.phase {
            Phase::Voting { vote, claimed, .. } => Some(VoteView {
                eligible_voter_ids: vote.eligible.iter().cloned().collect(),
                ballots: vote.ballots.clone(),
                tally: vote.tally(),
                policy: vote.policy,
                claimed: *claimed,
            }),
            _ => None,
        };

        Self {
            id: m.id.clone(),
            version,
            invite_id: m.invite_id.clone(),
            venue_id: m.venue_id.clone(),
            phase: m.phase.kind(),
            players: m
                .players
                .iter()
                .map(|p| PlayerPublic {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    letters: p.letters.clone(),
                    eliminated: p.is_eliminated(),
                })
                .collect(),
            current_turn_player_id: m.current_turn().cloned(),
            current_trick: attempt.map(|a| a.trick.clone()),
            trick_is_established: attempt.is_some_and(|a| a.established),
            originator_id: attempt.map(|a| a.originator.clone()),
            executor_id: attempt.map(|a| a.executor.clone()),
            vote,
            established_tricks: m.established_tricks.clone(),
            attempted_tricks: m.attempted_tricks.clone(),
            eliminated_ids: m.eliminated.clone(),
            winner_id: m.winner().cloned(),
            started_at: m.started_at,
            finished_at: m.finished_at(),
        }
    }
}
