//! Invite negotiation: create, respond, expire.

use rand::Rng;
use tracing::{info, warn};

use super::commit::{mutate, MutationError, Step};
use super::notifier::{dispatch, Notification};
use super::{with_view, Collaborators};
use crate::domain::rules::{MAX_PLAYERS, MIN_PLAYERS};
use crate::domain::{
    Answer, Invite, InviteId, InviteStatus, InviteView, Match, MatchId, MatchView, NewInvite,
    PlayerId, PlayerSnapshot, RespondOutcome, VenueId,
};
use crate::error::AppError;
use crate::errors::domain::{DomainError, NotFoundKind, ValidationKind};
use crate::store::typed::{load, load_by_key};
use crate::store::{Document, Versioned};

#[derive(Debug, Clone, serde::Serialize)]
pub struct RespondResult {
    pub invite: InviteView,
    /// Present when this response completed the invite.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#match: Option<MatchView>,
}

pub struct InviteService {
    ctx: Collaborators,
}

fn invite_missing(id: &InviteId) -> DomainError {
    DomainError::not_found(NotFoundKind::Invite, format!("Invite {id} not found"))
}

fn not_participant(player: &PlayerId, id: &InviteId) -> DomainError {
    DomainError::validation(
        ValidationKind::NotAParticipant,
        format!("Player {player} is not a participant of invite {id}"),
    )
}

impl InviteService {
    pub fn new(ctx: Collaborators) -> Self {
        Self { ctx }
    }

    /// Create an invite from `creator` to players currently online at `venue_id`.
    pub async fn create_invite(
        &self,
        creator: &PlayerSnapshot,
        venue_id: &VenueId,
        participant_ids: &[PlayerId],
    ) -> Result<InviteView, AppError> {
        let total = participant_ids.len() + 1;
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&total) {
            return Err(DomainError::validation(
                ValidationKind::InvalidParticipantCount,
                format!(
                    "An invite needs {MIN_PLAYERS} to {MAX_PLAYERS} players including the creator, got {total}"
                ),
            )
            .into());
        }

        let online = self
            .ctx
            .directory
            .list_online_players_at_venue(venue_id, &creator.id)
            .await?;
        let mut invitees = Vec::with_capacity(participant_ids.len());
        for id in participant_ids {
            let snapshot = online.iter().find(|p| &p.id == id).ok_or_else(|| {
                DomainError::validation(
                    ValidationKind::InvalidParticipantCount,
                    format!("Player {id} is not available at venue {venue_id}"),
                )
            })?;
            invitees.push(snapshot.clone());
        }

        let now = self.ctx.clock.now();
        let invite = Invite::create(NewInvite {
            creator: creator.clone(),
            venue_id: venue_id.clone(),
            invitees,
            now,
            ttl: self.ctx.config.invite_ttl,
        })?;
        self.ctx.store.apply(vec![invite.insert()?]).await?;

        info!(
            invite_id = %invite.id,
            creator_id = %creator.id,
            venue_id = %venue_id,
            participants = total,
            "invite created"
        );

        let batch = invite
            .participants
            .iter()
            .filter(|p| p.id != creator.id)
            .map(|p| {
                (
                    p.id.clone(),
                    Notification::InviteReceived {
                        invite_id: invite.id.clone(),
                        from_player_id: creator.id.clone(),
                        venue_id: venue_id.clone(),
                    },
                )
            })
            .collect();
        dispatch(self.ctx.notifier.as_ref(), batch).await;

        Ok(InviteView::of(&invite, 1, now))
    }

    /// Participants only; status reflects lazy expiry.
    pub async fn get_invite(&self, viewer: &PlayerId, id: &InviteId) -> Result<InviteView, AppError> {
        let found = load::<Invite>(self.ctx.store.as_ref(), id.as_str())
            .await?
            .ok_or_else(|| invite_missing(id))?;
        if !found.doc.is_participant(viewer) {
            return Err(not_participant(viewer, id).into());
        }
        Ok(InviteView::of(&found.doc, found.version, self.ctx.clock.now()))
    }

    /// Waiting invites that include `player`, oldest first.
    pub async fn list_waiting_for(&self, player: &PlayerId) -> Result<Vec<InviteView>, AppError> {
        let now = self.ctx.clock.now();
        let waiting =
            load_by_key::<Invite>(self.ctx.store.as_ref(), InviteStatus::Waiting.as_key()).await?;
        Ok(waiting
            .iter()
            .filter(|v| v.doc.is_participant(player))
            .filter(|v| v.doc.effective_status(now) == InviteStatus::Waiting)
            .map(|v| InviteView::of(&v.doc, v.version, now))
            .collect())
    }

    pub async fn respond(
        &self,
        player: &PlayerId,
        invite_id: &InviteId,
        answer: Answer,
    ) -> Result<RespondResult, AppError> {
        // Expiry is judged at write time, so each attempt reads the clock.
        let mut now = self.ctx.clock.now();
        let policy = self.ctx.config.vote_policy;

        let result = mutate(
            self.ctx.store.as_ref(),
            invite_id.as_str(),
            self.ctx.config.max_commit_attempts,
            || invite_missing(invite_id),
            |invite: &mut Invite| {
                now = self.ctx.clock.now();
                let outcome = invite.respond(player, answer, now)?;
                match outcome {
                    RespondOutcome::Unchanged => Ok(Step::skip((outcome, None))),
                    RespondOutcome::ReadyToConvert => {
                        let seat = rand::rng().random_range(0..invite.participants.len());
                        let created = Match::from_invite(invite, MatchId::generate(), seat, policy, now)?;
                        invite.mark_converted(created.id.clone(), now)?;
                        let insert = created.insert()?;
                        Ok(Step::write((outcome, Some(created))).and(insert))
                    }
                    _ => Ok(Step::write((outcome, None))),
                }
            },
        )
        .await;
        let committed = result.map_err(|e| self.rejection(e, now))?;

        let Versioned { doc: invite, version } = committed.doc;
        let (outcome, created) = committed.result;
        let view = InviteView::of(&invite, version, now);
        self.announce(&invite, player, outcome, created.as_ref()).await;

        if outcome == RespondOutcome::ExpiredOnArrival {
            return Err(with_view(AppError::from(invite.not_pending()), &view));
        }

        info!(
            invite_id = %invite.id,
            player_id = %player,
            outcome = ?outcome,
            status = invite.status.as_key(),
            "invite response applied"
        );
        Ok(RespondResult {
            invite: view,
            r#match: created.as_ref().map(|m| MatchView::of(m, 1)),
        })
    }

    /// Expire every waiting invite past its deadline. Idempotent; safe to run
    /// concurrently with itself and with responses.
    pub async fn sweep_expired(&self) -> Result<usize, AppError> {
        let now = self.ctx.clock.now();
        let waiting =
            load_by_key::<Invite>(self.ctx.store.as_ref(), InviteStatus::Waiting.as_key()).await?;

        let mut expired = 0;
        for candidate in waiting {
            if candidate.doc.effective_status(now) != InviteStatus::Expired {
                continue;
            }
            let id = candidate.doc.id.clone();
            let result = mutate(
                self.ctx.store.as_ref(),
                id.as_str(),
                self.ctx.config.max_commit_attempts,
                || invite_missing(&id),
                |invite: &mut Invite| {
                    if invite.expire_if_due(self.ctx.clock.now()) {
                        Ok(Step::write(true))
                    } else {
                        Ok(Step::skip(false))
                    }
                },
            )
            .await;

            match result {
                Ok(committed) if committed.result => {
                    expired += 1;
                    let invite = committed.doc.doc;
                    info!(invite_id = %invite.id, "invite expired");
                    dispatch(self.ctx.notifier.as_ref(), expired_batch(&invite)).await;
                }
                Ok(_) => {}
                Err(MutationError::Rejected { error, .. }) => {
                    warn!(invite_id = %id, error = %error, "invite sweep skipped");
                }
                Err(MutationError::Failed(error)) => return Err(error.into()),
            }
        }
        Ok(expired)
    }

    fn rejection(&self, err: MutationError<Invite>, now: time::OffsetDateTime) -> AppError {
        match err {
            MutationError::Rejected { error, current } => with_view(
                AppError::from(error),
                &InviteView::of(&current.doc, current.version, now),
            ),
            MutationError::Failed(error) => error.into(),
        }
    }

    async fn announce(
        &self,
        invite: &Invite,
        responder: &PlayerId,
        outcome: RespondOutcome,
        created: Option<&Match>,
    ) {
        let others = invite.participants.iter().filter(|p| &p.id != responder);
        let batch: Vec<(PlayerId, Notification)> = match (outcome, created) {
            (RespondOutcome::Cancelled, _) => others
                .map(|p| {
                    (
                        p.id.clone(),
                        Notification::InviteCancelled {
                            invite_id: invite.id.clone(),
                            by_player_id: responder.clone(),
                        },
                    )
                })
                .collect(),
            (RespondOutcome::ExpiredOnArrival, _) => expired_batch(invite),
            (RespondOutcome::ReadyToConvert, Some(created)) => {
                let mut batch: Vec<_> = invite
                    .participants
                    .iter()
                    .map(|p| {
                        (
                            p.id.clone(),
                            Notification::InviteConverted {
                                invite_id: invite.id.clone(),
                                match_id: created.id.clone(),
                            },
                        )
                    })
                    .collect();
                if let Some(turn) = created.current_turn() {
                    batch.push((
                        turn.clone(),
                        Notification::YourTurn {
                            match_id: created.id.clone(),
                            phase: created.phase.kind(),
                            trick: None,
                        },
                    ));
                }
                batch
            }
            _ => Vec::new(),
        };
        dispatch(self.ctx.notifier.as_ref(), batch).await;
    }
}

fn expired_batch(invite: &Invite) -> Vec<(PlayerId, Notification)> {
    invite
        .participants
        .iter()
        .map(|p| {
            (
                p.id.clone(),
                Notification::InviteExpired {
                    invite_id: invite.id.clone(),
                },
            )
        })
        .collect()
}
