//! Domain layer: pure game-coordination types and transitions.

pub mod ids;
pub mod invite;
pub mod match_state;
pub mod player;
pub mod ranking;
pub mod rotation;
pub mod rules;
pub mod snapshot;
pub mod transition;
pub mod vote;

#[cfg(test)]
mod test_gens;
#[cfg(test)]
mod tests_match;
#[cfg(test)]
mod tests_ranking;

// Re-exports for ergonomics
pub use ids::{InviteId, MatchId, PlayerId, VenueId};
pub use invite::{Answer, Invite, InviteStatus, NewInvite, RespondOutcome, ResponseState};
pub use match_state::{Attempt, Match, Phase, PhaseKind};
pub use player::{Player, PlayerSnapshot};
pub use ranking::{RankingRecord, Standing};
pub use snapshot::{InviteView, MatchView};
pub use transition::{derive_match_transitions, MatchEvent, MatchLifecycleView};
pub use vote::{Outcome, Tally, Vote, VotePolicy};
