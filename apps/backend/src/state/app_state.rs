use std::sync::Arc;

use crate::config::game::GameConfig;
use crate::services::{
    ChannelNotifier, Clock, InviteService, MatchService, PresenceDirectory, RankingRecorder,
};
use crate::store::DocumentStore;

use super::security_config::SecurityConfig;

/// Application state shared by every worker.
#[derive(Clone)]
pub struct AppState {
    /// Security configuration including JWT settings
    pub security: SecurityConfig,
    pub config: GameConfig,
    pub store: Arc<dyn DocumentStore>,
    pub clock: Arc<dyn Clock>,
    pub invites: Arc<InviteService>,
    pub matches: Arc<MatchService>,
    pub rankings: RankingRecorder,
    /// Who is online where; the invite service reads the same table.
    pub presence: Arc<PresenceDirectory>,
    /// Per-player notification channels backing the notifications stream.
    pub notifications: Arc<ChannelNotifier>,
}
