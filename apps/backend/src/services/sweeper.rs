//! Background invite sweeper.
//!
//! Expiry is already lazy, so this task only keeps stored statuses tidy and
//! sends expiry notifications promptly. Each pass also backfills ranking
//! records whose best-effort write failed earlier.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::invites::InviteService;
use super::rankings::RankingRecorder;
use crate::trace_ctx::{self, TraceId};

pub fn spawn_sweeper(
    invites: Arc<InviteService>,
    rankings: RankingRecorder,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_secs = every.as_secs(), "invite sweeper started");

        loop {
            ticker.tick().await;
            trace_ctx::with_trace_id(TraceId::generate().to_string(), sweep_once(&invites, &rankings))
                .await;
        }
    })
}

async fn sweep_once(invites: &InviteService, rankings: &RankingRecorder) {
    match invites.sweep_expired().await {
        Ok(0) => debug!("sweep found nothing to expire"),
        Ok(n) => info!(expired = n, "sweep expired invites"),
        Err(e) => warn!(error = %e, "invite sweep failed"),
    }
    match rankings.backfill().await {
        Ok(0) => {}
        Ok(n) => info!(recorded = n, "backfilled ranking records"),
        Err(e) => warn!(error = %e, "ranking backfill failed"),
    }
}
