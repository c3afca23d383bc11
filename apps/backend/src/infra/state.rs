use std::sync::Arc;

use crate::config::db::StoreBackend;
use crate::config::game::GameConfig;
use crate::error::AppError;
use crate::infra::db::open_store;
use crate::services::{
    ChannelNotifier, Clock, Collaborators, InviteService, MatchService, PresenceDirectory,
    RankingRecorder, SystemClock,
};
use crate::state::app_state::AppState;
use crate::state::security_config::SecurityConfig;
use crate::store::DocumentStore;

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    security_config: SecurityConfig,
    game_config: GameConfig,
    backend: StoreBackend,
    store: Option<Arc<dyn DocumentStore>>,
    clock: Arc<dyn Clock>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            security_config: SecurityConfig::default(),
            game_config: GameConfig::default(),
            backend: StoreBackend::Memory,
            store: None,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_store_backend(mut self, backend: StoreBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Use an already-open store; takes precedence over the backend.
    pub fn with_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_security(mut self, security_config: SecurityConfig) -> Self {
        self.security_config = security_config;
        self
    }

    pub fn with_game_config(mut self, game_config: GameConfig) -> Self {
        self.game_config = game_config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        let store = match self.store {
            Some(store) => store,
            None => open_store(&self.backend).await?,
        };
        let presence = Arc::new(PresenceDirectory::new());
        let notifications = Arc::new(ChannelNotifier::new());

        let ctx = Collaborators {
            store: store.clone(),
            directory: presence.clone(),
            notifier: notifications.clone(),
            clock: self.clock.clone(),
            config: self.game_config.clone(),
        };

        Ok(AppState {
            security: self.security_config,
            config: self.game_config,
            store: store.clone(),
            clock: self.clock,
            invites: Arc::new(InviteService::new(ctx.clone())),
            matches: Arc::new(MatchService::new(ctx)),
            rankings: RankingRecorder::new(store),
            presence,
            notifications,
        })
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
