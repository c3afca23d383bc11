//! Services: the public operations, bridging the pure domain with the
//! document store, the directory and the notifier.

use std::sync::Arc;

use serde::Serialize;

use crate::config::game::GameConfig;
use crate::error::AppError;
use crate::store::DocumentStore;

pub mod clock;
pub mod commit;
pub mod directory;
pub mod invites;
pub mod matches;
pub mod notifier;
pub mod rankings;
pub mod sweeper;

pub use clock::{Clock, ManualClock, SystemClock};
pub use directory::{PlayerDirectory, PresenceDirectory};
pub use invites::{InviteService, RespondResult};
pub use matches::MatchService;
pub use notifier::{ChannelNotifier, LogNotifier, Notification, Notifier};
pub use rankings::{RankingRecorder, RecordOutcome};

/// Everything a service talks to besides the domain.
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn DocumentStore>,
    pub directory: Arc<dyn PlayerDirectory>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
    pub config: GameConfig,
}

/// Attach the caller-facing view of the current record to a rejection.
pub(crate) fn with_view<V: Serialize>(err: AppError, view: &V) -> AppError {
    match serde_json::to_value(view) {
        Ok(state) => err.with_state(state),
        Err(_) => err,
    }
}
