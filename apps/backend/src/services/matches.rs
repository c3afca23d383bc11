//! Match operations: propose, report, vote.
//!
//! Each operation is one optimistic mutation of the match document. Effects
//! that must not hold up the transition (notifications, ranking) run only
//! after it has committed.

use time::OffsetDateTime;
use tracing::{debug, info};

use super::commit::{mutate, MutationError, Step};
use super::notifier::{dispatch, Notification};
use super::rankings::RankingRecorder;
use super::{with_view, Collaborators};
use crate::domain::{
    derive_match_transitions, Match, MatchEvent, MatchId, MatchLifecycleView, MatchView, Outcome,
    PlayerId,
};
use crate::error::AppError;
use crate::errors::domain::{DomainError, NotFoundKind, ValidationKind};
use crate::store::typed::{load, load_by_key};

pub struct MatchService {
    ctx: Collaborators,
    rankings: RankingRecorder,
}

fn match_missing(id: &MatchId) -> DomainError {
    DomainError::not_found(NotFoundKind::Match, format!("Match {id} not found"))
}

impl MatchService {
    pub fn new(ctx: Collaborators) -> Self {
        let rankings = RankingRecorder::new(ctx.store.clone());
        Self { ctx, rankings }
    }

    /// Only players seated in the match may read it.
    pub async fn get_match(&self, viewer: &PlayerId, id: &MatchId) -> Result<MatchView, AppError> {
        let found = load::<Match>(self.ctx.store.as_ref(), id.as_str())
            .await?
            .ok_or_else(|| match_missing(id))?;
        if !found.doc.is_player(viewer) {
            return Err(DomainError::validation(
                ValidationKind::NotAParticipant,
                format!("Player {viewer} is not seated in match {id}"),
            )
            .into());
        }
        Ok(MatchView::of(&found.doc, found.version))
    }

    /// Unfinished matches `player` is seated in.
    pub async fn list_active_for(&self, player: &PlayerId) -> Result<Vec<MatchView>, AppError> {
        self.list_seated(player, Match::ACTIVE_KEY).await
    }

    pub async fn list_finished_for(&self, player: &PlayerId) -> Result<Vec<MatchView>, AppError> {
        self.list_seated(player, Match::FINISHED_KEY).await
    }

    async fn list_seated(&self, player: &PlayerId, key: &str) -> Result<Vec<MatchView>, AppError> {
        let found = load_by_key::<Match>(self.ctx.store.as_ref(), key).await?;
        Ok(found
            .iter()
            .filter(|v| v.doc.is_player(player))
            .map(|v| MatchView::of(&v.doc, v.version))
            .collect())
    }

    pub async fn propose_trick(
        &self,
        player: &PlayerId,
        match_id: &MatchId,
        trick: &str,
    ) -> Result<MatchView, AppError> {
        self.run(match_id, player, "propose_trick", |m, _| {
            m.propose_trick(player, trick)
        })
        .await
    }

    pub async fn report_attempt(
        &self,
        player: &PlayerId,
        match_id: &MatchId,
        outcome: Outcome,
    ) -> Result<MatchView, AppError> {
        self.run(match_id, player, "report_attempt", |m, now| {
            m.report_attempt(player, outcome, now)
        })
        .await
    }

    pub async fn cast_vote(
        &self,
        player: &PlayerId,
        match_id: &MatchId,
        ballot: Outcome,
    ) -> Result<MatchView, AppError> {
        self.run(match_id, player, "cast_vote", |m, now| {
            m.cast_vote(player, ballot, now)
        })
        .await
    }

    async fn run<F>(
        &self,
        match_id: &MatchId,
        actor: &PlayerId,
        op: &'static str,
        mut apply: F,
    ) -> Result<MatchView, AppError>
    where
        F: FnMut(&mut Match, OffsetDateTime) -> Result<Vec<MatchEvent>, DomainError>,
    {
        let committed = mutate(
            self.ctx.store.as_ref(),
            match_id.as_str(),
            self.ctx.config.max_commit_attempts,
            || match_missing(match_id),
            |m: &mut Match| {
                let now = self.ctx.clock.now();
                let before = MatchLifecycleView::of(m);
                let mut events = apply(m, now)?;
                events.extend(derive_match_transitions(&before, &MatchLifecycleView::of(m)));
                Ok(Step::write(events))
            },
        )
        .await
        .map_err(|e| match e {
            MutationError::Rejected { error, current } => {
                debug!(match_id = %match_id, player_id = %actor, op, error = %error, "match operation rejected");
                with_view(
                    AppError::from(error),
                    &MatchView::of(&current.doc, current.version),
                )
            }
            MutationError::Failed(error) => error.into(),
        })?;

        let m = &committed.doc.doc;
        info!(
            match_id = %m.id,
            player_id = %actor,
            op,
            phase = m.phase.kind().as_str(),
            version = committed.doc.version,
            "match transition committed"
        );
        self.after_commit(m, &committed.result).await;

        Ok(MatchView::of(m, committed.doc.version))
    }

    async fn after_commit(&self, m: &Match, events: &[MatchEvent]) {
        let mut batch = Vec::new();
        for event in events {
            match event {
                MatchEvent::TurnBecame { player_id } => batch.push((
                    player_id.clone(),
                    Notification::YourTurn {
                        match_id: m.id.clone(),
                        phase: m.phase.kind(),
                        trick: m.phase.attempt().map(|a| a.trick.clone()),
                    },
                )),
                MatchEvent::VoteOpened { voter_ids } => {
                    if let Some(attempt) = m.phase.attempt() {
                        for voter in voter_ids {
                            batch.push((
                                voter.clone(),
                                Notification::VoteRequested {
                                    match_id: m.id.clone(),
                                    executor_id: attempt.executor.clone(),
                                    trick: attempt.trick.clone(),
                                },
                            ));
                        }
                    }
                }
                MatchEvent::PlayerEliminated { player_id } => {
                    info!(match_id = %m.id, player_id = %player_id, "player eliminated");
                }
                MatchEvent::MatchFinished { winner_id } => {
                    info!(match_id = %m.id, winner_id = ?winner_id, "match finished");
                    for p in &m.players {
                        batch.push((
                            p.id.clone(),
                            Notification::MatchFinished {
                                match_id: m.id.clone(),
                                winner_id: winner_id.clone(),
                            },
                        ));
                    }
                    self.rankings.record_best_effort(m).await;
                }
                _ => {}
            }
        }
        dispatch(self.ctx.notifier.as_ref(), batch).await;
    }
}
