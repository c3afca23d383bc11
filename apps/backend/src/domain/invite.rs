//! Multi-party invite negotiation.
//!
//! An invite waits for every participant to accept. The first decline
//! cancels it, and expiry is a pure function of wall-clock time evaluated
//! whenever the invite is inspected, so no timer has to fire for an invite
//! to behave as expired.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::domain::ids::{InviteId, MatchId, PlayerId, VenueId};
use crate::domain::player::PlayerSnapshot;
use crate::domain::rules::{MAX_PLAYERS, MIN_PLAYERS};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    Waiting,
    Expired,
    Cancelled,
    Converted,
}

impl InviteStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, InviteStatus::Waiting)
    }

    /// Store lookup key; invites are indexed by status.
    pub const fn as_key(self) -> &'static str {
        match self {
            InviteStatus::Waiting => "waiting",
            InviteStatus::Expired => "expired",
            InviteStatus::Cancelled => "cancelled",
            InviteStatus::Converted => "converted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseState {
    Pending,
    Accepted,
    Declined,
}

/// A participant's answer to an invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    Accepted,
    Declined,
}

/// What a response did to the invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespondOutcome {
    /// Acceptance recorded; others are still pending.
    Recorded,
    /// Same answer as before; nothing changed.
    Unchanged,
    /// A decline cancelled the invite.
    Cancelled,
    /// Every participant has accepted; the caller must create the match and
    /// call [`Invite::mark_converted`] in the same commit.
    ReadyToConvert,
    /// The invite was found past its deadline and is now expired. The
    /// response itself was not applied.
    ExpiredOnArrival,
}

#[derive(Debug, Clone)]
pub struct NewInvite {
    pub creator: PlayerSnapshot,
    pub venue_id: VenueId,
    pub invitees: Vec<PlayerSnapshot>,
    pub now: OffsetDateTime,
    pub ttl: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invite {
    pub id: InviteId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    pub creator_id: PlayerId,
    pub venue_id: VenueId,
    /// Creator first, then invitees in the order they were invited.
    pub participants: Vec<PlayerSnapshot>,
    pub responses: BTreeMap<PlayerId, ResponseState>,
    pub status: InviteStatus,
    /// Set when converted; the match created from this invite.
    pub match_id: Option<MatchId>,
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub closed_at: Option<OffsetDateTime>,
}

impl Invite {
    pub fn create(new: NewInvite) -> Result<Self, DomainError> {
        let total = new.invitees.len() + 1;
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&total) {
            return Err(DomainError::validation(
                ValidationKind::InvalidParticipantCount,
                format!(
                    "An invite needs {MIN_PLAYERS} to {MAX_PLAYERS} players including the creator, got {total}"
                ),
            ));
        }

        let mut seen = BTreeSet::new();
        seen.insert(new.creator.id.clone());
        for invitee in &new.invitees {
            if !seen.insert(invitee.id.clone()) {
                return Err(DomainError::validation(
                    ValidationKind::InvalidParticipantCount,
                    format!("Player {} is listed more than once", invitee.id),
                ));
            }
        }

        let mut responses = BTreeMap::new();
        responses.insert(new.creator.id.clone(), ResponseState::Accepted);
        for invitee in &new.invitees {
            responses.insert(invitee.id.clone(), ResponseState::Pending);
        }

        let mut participants = Vec::with_capacity(total);
        participants.push(new.creator.clone());
        participants.extend(new.invitees);

        Ok(Self {
            id: InviteId::generate(),
            created_at: new.now,
            expires_at: new.now + new.ttl,
            creator_id: new.creator.id,
            venue_id: new.venue_id,
            participants,
            responses,
            status: InviteStatus::Waiting,
            match_id: None,
            closed_at: None,
        })
    }

    pub fn is_participant(&self, player: &PlayerId) -> bool {
        self.responses.contains_key(player)
    }

    /// Status as any observer at `now` must see it, whether or not the
    /// expiry has been written yet.
    pub fn effective_status(&self, now: OffsetDateTime) -> InviteStatus {
        if self.status == InviteStatus::Waiting && now > self.expires_at {
            InviteStatus::Expired
        } else {
            self.status
        }
    }

    /// Transition `Waiting` to `Expired` if the deadline has passed.
    /// Returns whether anything changed; terminal invites are never touched.
    pub fn expire_if_due(&mut self, now: OffsetDateTime) -> bool {
        if self.status == InviteStatus::Waiting && now > self.expires_at {
            self.status = InviteStatus::Expired;
            self.closed_at = Some(now);
            return true;
        }
        false
    }

    pub fn all_accepted(&self) -> bool {
        self.responses
            .values()
            .all(|r| *r == ResponseState::Accepted)
    }

    pub fn respond(
        &mut self,
        player: &PlayerId,
        answer: Answer,
        now: OffsetDateTime,
    ) -> Result<RespondOutcome, DomainError> {
        let current = *self.responses.get(player).ok_or_else(|| {
            DomainError::validation(
                ValidationKind::NotAParticipant,
                format!("Player {player} is not a participant of invite {}", self.id),
            )
        })?;

        if self.expire_if_due(now) {
            return Ok(RespondOutcome::ExpiredOnArrival);
        }
        if self.status != InviteStatus::Waiting {
            return Err(self.not_pending());
        }

        match answer {
            Answer::Declined => {
                self.responses
                    .insert(player.clone(), ResponseState::Declined);
                self.status = InviteStatus::Cancelled;
                self.closed_at = Some(now);
                Ok(RespondOutcome::Cancelled)
            }
            Answer::Accepted if current == ResponseState::Accepted => {
                Ok(RespondOutcome::Unchanged)
            }
            Answer::Accepted => {
                self.responses
                    .insert(player.clone(), ResponseState::Accepted);
                if self.all_accepted() {
                    Ok(RespondOutcome::ReadyToConvert)
                } else {
                    Ok(RespondOutcome::Recorded)
                }
            }
        }
    }

    /// Final step of a full-accept consensus.
    pub fn mark_converted(
        &mut self,
        match_id: MatchId,
        now: OffsetDateTime,
    ) -> Result<(), DomainError> {
        if self.status != InviteStatus::Waiting || !self.all_accepted() {
            return Err(self.not_pending());
        }
        self.status = InviteStatus::Converted;
        self.match_id = Some(match_id);
        self.closed_at = Some(now);
        Ok(())
    }

    pub fn not_pending(&self) -> DomainError {
        DomainError::conflict(
            ConflictKind::InviteNotPending,
            format!(
                "Invite {} is {} and no longer accepts responses",
                self.id,
                self.status.as_key()
            ),
        )
    }
}
