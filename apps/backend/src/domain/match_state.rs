//! Authoritative per-match state and its transitions.
//!
//! Every operation validates its preconditions against the current phase and
//! either mutates `self` into the next legal state or returns an error without
//! touching anything. Persistence and concurrency live elsewhere; this type is
//! pure and deterministic given its inputs.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::ids::{InviteId, MatchId, PlayerId, VenueId};
use crate::domain::invite::Invite;
use crate::domain::player::Player;
use crate::domain::rotation::{active_players, next_active_after};
use crate::domain::rules::{clean_trick_name, trick_key};
use crate::domain::transition::MatchEvent;
use crate::domain::vote::{Outcome, Vote, VotePolicy};
use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, ValidationKind,
};

/// The trick currently being attempted and who is attempting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    pub trick: String,
    /// False while the originator is still proving the trick.
    pub established: bool,
    pub originator: PlayerId,
    pub executor: PlayerId,
}

impl Attempt {
    pub fn is_origination(&self) -> bool {
        self.executor == self.originator
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    AwaitingProposal {
        turn: PlayerId,
    },
    Attempting {
        attempt: Attempt,
    },
    Voting {
        attempt: Attempt,
        /// What the executor reported; stands in when no voter is eligible.
        claimed: Outcome,
        vote: Vote,
    },
    Finished {
        winner: Option<PlayerId>,
        #[serde(with = "time::serde::rfc3339")]
        finished_at: OffsetDateTime,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    AwaitingProposal,
    Attempting,
    Voting,
    Finished,
}

impl PhaseKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            PhaseKind::AwaitingProposal => "awaiting_proposal",
            PhaseKind::Attempting => "attempting",
            PhaseKind::Voting => "voting",
            PhaseKind::Finished => "finished",
        }
    }
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::AwaitingProposal { .. } => PhaseKind::AwaitingProposal,
            Phase::Attempting { .. } => PhaseKind::Attempting,
            Phase::Voting { .. } => PhaseKind::Voting,
            Phase::Finished { .. } => PhaseKind::Finished,
        }
    }

    pub fn attempt(&self) -> Option<&Attempt> {
        match self {
            Phase::Attempting { attempt } | Phase::Voting { attempt, .. } => Some(attempt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub invite_id: InviteId,
    pub venue_id: VenueId,
    /// Fixed at creation; order defines rotation.
    pub players: Vec<Player>,
    pub phase: Phase,
    pub established_tricks: Vec<String>,
    pub attempted_tricks: Vec<String>,
    /// In elimination order.
    pub eliminated: Vec<PlayerId>,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    pub vote_policy: VotePolicy,
}

impl Match {
    pub const ACTIVE_KEY: &'static str = "active";
    pub const FINISHED_KEY: &'static str = "finished";

    /// Seat the accepted participants of `invite`. `first_turn_seat` picks
    /// who proposes first and is taken modulo the number of players.
    pub fn from_invite(
        invite: &Invite,
        id: MatchId,
        first_turn_seat: usize,
        vote_policy: VotePolicy,
        now: OffsetDateTime,
    ) -> Result<Self, DomainError> {
        if !invite.all_accepted() || invite.participants.is_empty() {
            return Err(invite.not_pending());
        }
        let players: Vec<Player> = invite
            .participants
            .iter()
            .map(Player::from_snapshot)
            .collect();
        let turn = players[first_turn_seat % players.len()].id.clone();

        Ok(Self {
            id,
            invite_id: invite.id.clone(),
            venue_id: invite.venue_id.clone(),
            players,
            phase: Phase::AwaitingProposal { turn },
            established_tricks: Vec::new(),
            attempted_tricks: Vec::new(),
            eliminated: Vec::new(),
            started_at: now,
            vote_policy,
        })
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished { .. })
    }

    /// Store lookup key.
    pub fn lookup_key(&self) -> &'static str {
        if self.is_finished() {
            Self::FINISHED_KEY
        } else {
            Self::ACTIVE_KEY
        }
    }

    /// The player expected to act next: the proposer, or the executor while
    /// an attempt is live. `None` once finished.
    pub fn current_turn(&self) -> Option<&PlayerId> {
        match &self.phase {
            Phase::AwaitingProposal { turn } => Some(turn),
            Phase::Attempting { attempt } | Phase::Voting { attempt, .. } => {
                Some(&attempt.executor)
            }
            Phase::Finished { .. } => None,
        }
    }

    pub fn vote(&self) -> Option<&Vote> {
        match &self.phase {
            Phase::Voting { vote, .. } => Some(vote),
            _ => None,
        }
    }

    pub fn winner(&self) -> Option<&PlayerId> {
        match &self.phase {
            Phase::Finished { winner, .. } => winner.as_ref(),
            _ => None,
        }
    }

    pub fn finished_at(&self) -> Option<OffsetDateTime> {
        match &self.phase {
            Phase::Finished { finished_at, .. } => Some(*finished_at),
            _ => None,
        }
    }

    pub fn is_player(&self, id: &PlayerId) -> bool {
        self.players.iter().any(|p| &p.id == id)
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub fn active_player_ids(&self) -> Vec<PlayerId> {
        active_players(&self.players)
    }

    pub fn propose_trick(
        &mut self,
        player: &PlayerId,
        raw_name: &str,
    ) -> Result<Vec<MatchEvent>, DomainError> {
        let Phase::AwaitingProposal { turn } = &self.phase else {
            return Err(self.wrong_phase("propose a trick"));
        };
        if turn != player {
            return Err(DomainError::validation(
                ValidationKind::NotYourTurn,
                format!("It is {turn}'s turn to propose, not {player}'s"),
            ));
        }

        let trick = clean_trick_name(raw_name)?;
        let key = trick_key(&trick);
        if self.established_tricks.iter().any(|t| trick_key(t) == key) {
            return Err(DomainError::conflict(
                ConflictKind::TrickAlreadyEstablished,
                format!("'{trick}' was already established in this match"),
            ));
        }

        self.attempted_tricks.push(trick.clone());
        self.phase = Phase::Attempting {
            attempt: Attempt {
                trick: trick.clone(),
                established: false,
                originator: player.clone(),
                executor: player.clone(),
            },
        };
        Ok(vec![MatchEvent::TrickProposed {
            player_id: player.clone(),
            trick,
        }])
    }

    pub fn report_attempt(
        &mut self,
        player: &PlayerId,
        claimed: Outcome,
        now: OffsetDateTime,
    ) -> Result<Vec<MatchEvent>, DomainError> {
        let Phase::Attempting { attempt } = &self.phase else {
            return Err(self.wrong_phase("report an attempt"));
        };
        if &attempt.executor != player {
            return Err(DomainError::validation(
                ValidationKind::NotExecutor,
                format!(
                    "{} is attempting '{}', not {player}",
                    attempt.executor, attempt.trick
                ),
            ));
        }
        let attempt = attempt.clone();
        let mut events = Vec::new();

        // Inventor's free miss: no vote, no penalty.
        if attempt.is_origination() && claimed == Outcome::Miss {
            events.push(MatchEvent::AttemptResolved {
                executor_id: attempt.executor.clone(),
                outcome: Outcome::Miss,
                by_vote: false,
            });
            self.phase = Phase::AwaitingProposal {
                turn: self.next_after(&attempt.originator)?,
            };
            return Ok(events);
        }

        let voters = self.eligible_voters(&attempt);
        if self.active_player_ids().len() <= 2 || voters.is_empty() {
            events.push(MatchEvent::AttemptResolved {
                executor_id: attempt.executor.clone(),
                outcome: claimed,
                by_vote: false,
            });
            self.resolve(attempt, claimed, now, &mut events)?;
            return Ok(events);
        }

        self.phase = Phase::Voting {
            attempt,
            claimed,
            vote: Vote::open(voters, self.vote_policy),
        };
        Ok(events)
    }

    pub fn cast_vote(
        &mut self,
        voter: &PlayerId,
        ballot: Outcome,
        now: OffsetDateTime,
    ) -> Result<Vec<MatchEvent>, DomainError> {
        let Phase::Voting { attempt, vote, .. } = &mut self.phase else {
            return Err(self.wrong_phase("vote"));
        };
        let resolved = vote.cast(voter, ballot)?;
        let attempt = attempt.clone();

        let mut events = vec![MatchEvent::BallotCast {
            voter_id: voter.clone(),
        }];
        if let Some(outcome) = resolved {
            events.push(MatchEvent::AttemptResolved {
                executor_id: attempt.executor.clone(),
                outcome,
                by_vote: true,
            });
            self.resolve(attempt, outcome, now, &mut events)?;
        }
        Ok(events)
    }

    /// Non-eliminated players other than the originator and executor.
    pub fn eligible_voters(&self, attempt: &Attempt) -> Vec<PlayerId> {
        self.active_player_ids()
            .into_iter()
            .filter(|id| id != &attempt.originator && id != &attempt.executor)
            .collect()
    }

    /// Check structural invariants. Used by tests and when loading documents.
    pub fn check_invariants(&self) -> Result<(), String> {
        let active = self.active_player_ids();
        match &self.phase {
            Phase::Finished { winner, .. } => {
                if active.len() > 1 {
                    return Err(format!("finished with {} active players", active.len()));
                }
                if winner.as_ref() != active.first() {
                    return Err("winner is not the last active player".into());
                }
            }
            _ => {
                if active.len() <= 1 {
                    return Err("unfinished with at most one active player".into());
                }
                let Some(turn) = self.current_turn() else {
                    return Err("no current turn".into());
                };
                if !active.contains(turn) {
                    return Err(format!("turn held by eliminated player {turn}"));
                }
            }
        }

        if let Phase::Voting { attempt, vote, .. } = &self.phase {
            if vote.eligible.contains(&attempt.originator)
                || vote.eligible.contains(&attempt.executor)
            {
                return Err("originator or executor may not vote".into());
            }
            if vote.ballots.keys().any(|k| !vote.eligible.contains(k)) {
                return Err("ballot from ineligible voter".into());
            }
        }

        let mut keys: Vec<String> = self.established_tricks.iter().map(|t| trick_key(t)).collect();
        keys.sort();
        let before = keys.len();
        keys.dedup();
        if keys.len() != before {
            return Err("duplicate established trick".into());
        }

        let eliminated: Vec<&PlayerId> = self
            .players
            .iter()
            .filter(|p| p.is_eliminated())
            .map(|p| &p.id)
            .collect();
        if eliminated.len() != self.eliminated.len()
            || eliminated.iter().any(|id| !self.eliminated.contains(id))
        {
            return Err("eliminated list out of sync with letters".into());
        }
        Ok(())
    }

    fn resolve(
        &mut self,
        attempt: Attempt,
        outcome: Outcome,
        now: OffsetDateTime,
        events: &mut Vec<MatchEvent>,
    ) -> Result<(), DomainError> {
        match (attempt.is_origination(), outcome) {
            (true, Outcome::Hit) => {
                let key = trick_key(&attempt.trick);
                if !self.established_tricks.iter().any(|t| trick_key(t) == key) {
                    self.established_tricks.push(attempt.trick.clone());
                }
                events.push(MatchEvent::TrickEstablished {
                    trick: attempt.trick.clone(),
                    originator_id: attempt.originator.clone(),
                });
                let executor = self.next_after(&attempt.originator)?;
                self.phase = Phase::Attempting {
                    attempt: Attempt {
                        established: true,
                        executor,
                        ..attempt
                    },
                };
            }
            (false, Outcome::Hit) => {
                let next = self.next_after(&attempt.executor)?;
                if next == attempt.originator {
                    // Everyone else landed it; the lap is over.
                    self.phase = Phase::AwaitingProposal {
                        turn: self.next_after(&attempt.originator)?,
                    };
                } else {
                    self.phase = Phase::Attempting {
                        attempt: Attempt {
                            executor: next,
                            ..attempt
                        },
                    };
                }
            }
            (true, Outcome::Miss) => {
                self.phase = Phase::AwaitingProposal {
                    turn: self.next_after(&attempt.originator)?,
                };
            }
            (false, Outcome::Miss) => {
                self.penalize(&attempt.executor, events)?;
                if !self.finish_if_decided(now) {
                    self.phase = Phase::AwaitingProposal {
                        turn: self.next_after(&attempt.executor)?,
                    };
                }
            }
        }
        Ok(())
    }

    fn penalize(
        &mut self,
        player_id: &PlayerId,
        events: &mut Vec<MatchEvent>,
    ) -> Result<(), DomainError> {
        let player = self
            .players
            .iter_mut()
            .find(|p| &p.id == player_id)
            .ok_or_else(|| corrupt(format!("executor {player_id} is not seated")))?;
        if player.is_eliminated() {
            return Ok(());
        }

        let eliminated_now = player.charge_letter();
        events.push(MatchEvent::LetterCharged {
            player_id: player_id.clone(),
            letters: player.letters.clone(),
        });
        if eliminated_now && !self.eliminated.contains(player_id) {
            self.eliminated.push(player_id.clone());
            events.push(MatchEvent::PlayerEliminated {
                player_id: player_id.clone(),
            });
        }
        Ok(())
    }

    fn finish_if_decided(&mut self, now: OffsetDateTime) -> bool {
        let active = self.active_player_ids();
        if active.len() > 1 {
            return false;
        }
        let winner = active.into_iter().next();
        self.phase = Phase::Finished {
            winner,
            finished_at: now,
        };
        true
    }

    fn next_after(&self, from: &PlayerId) -> Result<PlayerId, DomainError> {
        next_active_after(&self.players, from)
            .ok_or_else(|| corrupt(format!("no active player after {from}")))
    }

    fn wrong_phase(&self, action: &str) -> DomainError {
        DomainError::wrong_phase(format!(
            "Cannot {action} while match is {}",
            self.phase.kind().as_str()
        ))
    }
}

fn corrupt(detail: String) -> DomainError {
    DomainError::infra(InfraErrorKind::DataCorruption, detail)
}
