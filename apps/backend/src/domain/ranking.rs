//! Immutable summary of a finished match.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::ids::{MatchId, PlayerId, VenueId};
use crate::domain::match_state::Match;

/// Final placing of one player. Place 1 is the winner; the first player
/// eliminated takes the last place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub player_id: PlayerId,
    pub name: String,
    pub letters: String,
    pub place: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingRecord {
    pub match_id: MatchId,
    pub venue_id: VenueId,
    pub winner_id: Option<PlayerId>,
    /// Ordered by elimination time.
    pub eliminated_ids: Vec<PlayerId>,
    pub established_tricks: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
    pub duration_seconds: i64,
    pub standings: Vec<Standing>,
}

impl RankingRecord {
    /// `None` unless the match is finished.
    pub fn from_match(m: &Match) -> Option<Self> {
        let finished_at = m.finished_at()?;

        let order = m
            .winner()
            .into_iter()
            .chain(m.eliminated.iter().rev());
        let standings = order
            .filter_map(|id| m.player(id))
            .enumerate()
            .map(|(i, p)| Standing {
                player_id: p.id.clone(),
                name: p.name.clone(),
                letters: p.letters.clone(),
                place: u8::try_from(i + 1).unwrap_or(u8::MAX),
            })
            .collect();

        Some(Self {
            match_id: m.id.clone(),
            venue_id: m.venue_id.clone(),
            winner_id: m.winner().cloned(),
            eliminated_ids: m.eliminated.clone(),
            established_tricks: m.established_tricks.clone(),
            started_at: m.started_at,
            finished_at,
            duration_seconds: (finished_at - m.started_at).whole_seconds().max(0),
            standings,
        })
    }
}
