//! Peer-consensus adjudication of a single attempt.
//!
//! A vote is embedded in the match while it is in the Voting phase. Quorum is
//! reached once every eligible voter has cast a ballot; resolution is a pure
//! function of the ballot multiset and the policy recorded at open time.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::ids::PlayerId;
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};

/// Result of an attempt, as self-reported or as voted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Hit,
    Miss,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VotePolicy {
    /// `hit` only with strictly more hit ballots than miss ballots; ties miss.
    #[default]
    Majority,
    /// `hit` only if every ballot is hit.
    Unanimous,
}

impl VotePolicy {
    pub fn resolve<'a>(self, ballots: impl IntoIterator<Item = &'a Outcome>) -> Outcome {
        let (mut hits, mut misses) = (0usize, 0usize);
        for ballot in ballots {
            match ballot {
                Outcome::Hit => hits += 1,
                Outcome::Miss => misses += 1,
            }
        }
        let hit = match self {
            VotePolicy::Majority => hits > misses,
            VotePolicy::Unanimous => hits > 0 && misses == 0,
        };
        if hit {
            Outcome::Hit
        } else {
            Outcome::Miss
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub hits: usize,
    pub misses: usize,
    pub outstanding: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub eligible: BTreeSet<PlayerId>,
    pub ballots: BTreeMap<PlayerId, Outcome>,
    pub policy: VotePolicy,
    /// Set exactly once, when the last eligible ballot arrives.
    pub outcome: Option<Outcome>,
}

impl Vote {
    pub fn open(eligible: impl IntoIterator<Item = PlayerId>, policy: VotePolicy) -> Self {
        Self {
            eligible: eligible.into_iter().collect(),
            ballots: BTreeMap::new(),
            policy,
            outcome: None,
        }
    }

    pub fn has_quorum(&self) -> bool {
        self.ballots.len() == self.eligible.len()
    }

    pub fn tally(&self) -> Tally {
        let hits = self.ballots.values().filter(|b| **b == Outcome::Hit).count();
        Tally {
            hits,
            misses: self.ballots.len() - hits,
            outstanding: self.eligible.len() - self.ballots.len(),
        }
    }

    /// Record a ballot. Returns the outcome when this ballot completes quorum.
    pub fn cast(&mut self, voter: &PlayerId, ballot: Outcome) -> Result<Option<Outcome>, DomainError> {
        if self.outcome.is_some() {
            return Err(DomainError::wrong_phase("Vote is already resolved"));
        }
        if !self.eligible.contains(voter) {
            return Err(DomainError::validation(
                ValidationKind::NotEligibleVoter,
                format!("Player {voter} is not eligible to vote on this attempt"),
            ));
        }
        if self.ballots.contains_key(voter) {
            return Err(DomainError::conflict(
                ConflictKind::AlreadyVoted,
                format!("Player {voter} already voted on this attempt"),
            ));
        }

        self.ballots.insert(voter.clone(), ballot);

        if self.has_quorum() {
            let outcome = self.policy.resolve(self.ballots.values());
            self.outcome = Some(outcome);
            return Ok(Some(outcome));
        }
        Ok(None)
    }
}
