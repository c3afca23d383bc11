//! Ranking records for finished matches.
//!
//! Recording is auxiliary: a failure is logged and never touches the match.
//! The match id is the record id, so a second attempt is a no-op.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{Match, MatchId, RankingRecord, VenueId};
use crate::errors::domain::{ConflictKind, DomainError};
use crate::store::typed::{load, load_by_key, Versioned};
use crate::store::{Document, DocumentStore, StoredDoc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded,
    AlreadyRecorded,
}

#[derive(Clone)]
pub struct RankingRecorder {
    store: Arc<dyn DocumentStore>,
}

impl RankingRecorder {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn record(&self, m: &Match) -> Result<RecordOutcome, DomainError> {
        let record = RankingRecord::from_match(m).ok_or_else(|| {
            DomainError::wrong_phase(format!("Match {} has not finished", m.id))
        })?;

        match self.store.apply(vec![record.insert()?]).await {
            Ok(_) => {
                info!(match_id = %m.id, venue_id = %m.venue_id, "ranking recorded");
                Ok(RecordOutcome::Recorded)
            }
            Err(DomainError::Conflict(ConflictKind::DuplicateDocument, _)) => {
                Ok(RecordOutcome::AlreadyRecorded)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn record_best_effort(&self, m: &Match) {
        if let Err(e) = self.record(m).await {
            warn!(match_id = %m.id, error = %e, "ranking record failed; match result stands");
        }
    }

    /// Record any finished match that has no ranking yet. A match that
    /// cannot be decoded or recorded is logged and left for the next pass.
    pub async fn backfill(&self) -> Result<usize, DomainError> {
        let finished = self
            .store
            .find_by_key(Match::COLLECTION, Match::FINISHED_KEY)
            .await?;
        let mut recorded = 0;
        for raw in finished {
            let match_id = raw.id.clone();
            match self.backfill_one(raw).await {
                Ok(Some(RecordOutcome::Recorded)) => recorded += 1,
                Ok(_) => {}
                Err(e) => {
                    warn!(match_id = %match_id, error = %e, "ranking backfill skipped match");
                }
            }
        }
        Ok(recorded)
    }

    async fn backfill_one(&self, raw: StoredDoc) -> Result<Option<RecordOutcome>, DomainError> {
        let m = Versioned::<Match>::decode(raw)?.doc;
        if self.get(&m.id).await?.is_some() {
            return Ok(None);
        }
        self.record(&m).await.map(Some)
    }

    pub async fn get(&self, match_id: &MatchId) -> Result<Option<RankingRecord>, DomainError> {
        Ok(load::<RankingRecord>(self.store.as_ref(), match_id.as_str())
            .await?
            .map(|v| v.doc))
    }

    /// Newest first.
    pub async fn list_for_venue(&self, venue_id: &VenueId) -> Result<Vec<RankingRecord>, DomainError> {
        let mut records: Vec<RankingRecord> =
            load_by_key::<RankingRecord>(self.store.as_ref(), venue_id.as_str())
                .await?
                .into_iter()
                .map(|v| v.doc)
                .collect();
        records.sort_by(|a, b| b.finished_at.cmp(&a.finished_at));
        Ok(records)
    }
}
