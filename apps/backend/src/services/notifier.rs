//! Best-effort player notifications.
//!
//! Dispatch happens after a state change has committed. A failed delivery is
//! logged and dropped; it never rolls back or blocks the transition.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::domain::{InviteId, MatchId, PhaseKind, PlayerId, VenueId};

const PLAYER_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    InviteReceived {
        invite_id: InviteId,
        from_player_id: PlayerId,
        venue_id: VenueId,
    },
    InviteCancelled {
        invite_id: InviteId,
        by_player_id: PlayerId,
    },
    InviteExpired {
        invite_id: InviteId,
    },
    InviteConverted {
        invite_id: InviteId,
        match_id: MatchId,
    },
    YourTurn {
        match_id: MatchId,
        phase: PhaseKind,
        trick: Option<String>,
    },
    VoteRequested {
        match_id: MatchId,
        executor_id: PlayerId,
        trick: String,
    },
    MatchFinished {
        match_id: MatchId,
        winner_id: Option<PlayerId>,
    },
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::InviteReceived { .. } => "invite_received",
            Notification::InviteCancelled { .. } => "invite_cancelled",
            Notification::InviteExpired { .. } => "invite_expired",
            Notification::InviteConverted { .. } => "invite_converted",
            Notification::YourTurn { .. } => "your_turn",
            Notification::VoteRequested { .. } => "vote_requested",
            Notification::MatchFinished { .. } => "match_finished",
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification channel closed: {0}")]
    Closed(String),
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, to: &PlayerId, notification: Notification) -> Result<(), NotifyError>;
}

/// Fire-and-forget fan-out; errors are logged and swallowed.
pub async fn dispatch(notifier: &dyn Notifier, batch: Vec<(PlayerId, Notification)>) {
    for (to, notification) in batch {
        let kind = notification.kind();
        if let Err(e) = notifier.notify(&to, notification).await {
            warn!(player_id = %to, kind, error = %e, "notification dispatch failed");
        }
    }
}

/// Writes notifications to the log and nothing else.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, to: &PlayerId, notification: Notification) -> Result<(), NotifyError> {
        info!(player_id = %to, kind = notification.kind(), "notification");
        Ok(())
    }
}

/// Per-player broadcast channels. Players without a live subscriber simply
/// miss the message.
#[derive(Debug, Default)]
pub struct ChannelNotifier {
    channels: DashMap<PlayerId, broadcast::Sender<Notification>>,
}

impl ChannelNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, player: &PlayerId) -> broadcast::Receiver<Notification> {
        self.channels
            .entry(player.clone())
            .or_insert_with(|| broadcast::channel(PLAYER_CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Drop channels nobody listens to any more.
    pub fn prune(&self) {
        self.channels.retain(|_, tx| tx.receiver_count() > 0);
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, to: &PlayerId, notification: Notification) -> Result<(), NotifyError> {
        if let Some(tx) = self.channels.get(to) {
            // Zero receivers is not a failure.
            let _ = tx.send(notification);
        }
        Ok(())
    }
}
