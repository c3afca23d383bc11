//! Player/venue directory.
//!
//! The engine only asks who is online at a venue when an invite is created.
//! `PresenceDirectory` is an in-process presence table fed by check-in and
//! check-out calls.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::debug;

use crate::domain::{PlayerId, PlayerSnapshot, VenueId};
use crate::errors::domain::DomainError;

#[async_trait]
pub trait PlayerDirectory: Send + Sync {
    async fn list_online_players_at_venue(
        &self,
        venue_id: &VenueId,
        excluding: &PlayerId,
    ) -> Result<Vec<PlayerSnapshot>, DomainError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Presence {
    pub name: String,
    pub venue_id: VenueId,
    #[serde(with = "time::serde::rfc3339")]
    pub since: OffsetDateTime,
}

#[derive(Debug, Default)]
pub struct PresenceDirectory {
    entries: DashMap<PlayerId, Presence>,
}

impl PresenceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `player` online at `venue_id`, moving them from any other venue.
    pub fn check_in(&self, player: &PlayerSnapshot, venue_id: &VenueId, now: OffsetDateTime) {
        debug!(player_id = %player.id, venue_id = %venue_id, "presence check-in");
        self.entries.insert(
            player.id.clone(),
            Presence {
                name: player.name.clone(),
                venue_id: venue_id.clone(),
                since: now,
            },
        );
    }

    /// Returns whether the player was online anywhere.
    pub fn check_out(&self, player_id: &PlayerId) -> bool {
        debug!(player_id = %player_id, "presence check-out");
        self.entries.remove(player_id).is_some()
    }

    pub fn presence_of(&self, player_id: &PlayerId) -> Option<Presence> {
        self.entries.get(player_id).map(|p| p.clone())
    }
}

#[async_trait]
impl PlayerDirectory for PresenceDirectory {
    async fn list_online_players_at_venue(
        &self,
        venue_id: &VenueId,
        excluding: &PlayerId,
    ) -> Result<Vec<PlayerSnapshot>, DomainError> {
        let mut players: Vec<PlayerSnapshot> = self
            .entries
            .iter()
            .filter(|e| &e.value().venue_id == venue_id && e.key() != excluding)
            .map(|e| PlayerSnapshot {
                id: e.key().clone(),
                name: e.value().name.clone(),
            })
            .collect();
        players.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(players)
    }
}
