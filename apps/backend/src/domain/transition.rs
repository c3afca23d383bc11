//! Observable effects of a match operation.
//!
//! Operations return the explicit events they caused; edge-triggered events
//! (turn handed over, vote opened, match finished) are derived by comparing
//! lifecycle views before and after, so callers never miss one.

use serde::{Deserialize, Serialize};

use crate::domain::ids::PlayerId;
use crate::domain::match_state::{Match, PhaseKind};
use crate::domain::vote::Outcome;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchEvent {
    TrickProposed { player_id: PlayerId, trick: String },
    BallotCast { voter_id: PlayerId },
    AttemptResolved {
        executor_id: PlayerId,
        outcome: Outcome,
        by_vote: bool,
    },
    TrickEstablished { trick: String, originator_id: PlayerId },
    LetterCharged { player_id: PlayerId, letters: String },
    PlayerEliminated { player_id: PlayerId },

    /// Edge-triggered: a player must act now, either a new turn holder or
    /// the same holder moving on to propose.
    TurnBecame { player_id: PlayerId },
    /// Edge-triggered: voters are needed.
    VoteOpened { voter_ids: Vec<PlayerId> },
    /// Edge-triggered: the match reached its terminal phase.
    MatchFinished { winner_id: Option<PlayerId> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchLifecycleView {
    pub phase: PhaseKind,
    pub turn: Option<PlayerId>,
    pub voters: Vec<PlayerId>,
    pub winner: Option<PlayerId>,
}

impl MatchLifecycleView {
    pub fn of(m: &Match) -> Self {
        Self {
            phase: m.phase.kind(),
            turn: m.current_turn().cloned(),
            voters: m
                .vote()
                .map(|v| v.eligible.iter().cloned().collect())
                .unwrap_or_default(),
            winner: m.winner().cloned(),
        }
    }
}

/// Derive edge-triggered events from before/after lifecycle state.
pub fn derive_match_transitions(
    before: &MatchLifecycleView,
    after: &MatchLifecycleView,
) -> Vec<MatchEvent> {
    let mut transitions = Vec::new();

    if let Some(player_id) = &after.turn {
        let handed_over = before.turn.as_ref() != Some(player_id);
        // A lap that ends with its last replicator leaves the same player
        // holding the turn, now as proposer.
        let now_proposing = after.phase == PhaseKind::AwaitingProposal
            && before.phase != PhaseKind::AwaitingProposal;
        if handed_over || now_proposing {
            transitions.push(MatchEvent::TurnBecame {
                player_id: player_id.clone(),
            });
        }
    }

    if before.phase != PhaseKind::Voting && after.phase == PhaseKind::Voting {
        transitions.push(MatchEvent::VoteOpened {
            voter_ids: after.voters.clone(),
        });
    }

    if before.phase != PhaseKind::Finished && after.phase == PhaseKind::Finished {
        transitions.push(MatchEvent::MatchFinished {
            winner_id: after.winner.clone(),
        });
    }

    transitions
}
