#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod auth;
pub mod config;
pub mod domain;
pub mod entities;
pub mod error;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod infra;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod trace_ctx;

// Re-exports for public API
pub use auth::jwt::{mint_access_token, verify_access_token, Claims};
pub use config::db::{DbProfile, StoreBackend};
pub use config::game::GameConfig;
pub use error::AppError;
pub use extractors::{CurrentPlayer, JsonBody};
pub use infra::db::{connect_db, open_store};
pub use middleware::{AccessLog, RequestTrace, TraceSpan};
pub use state::app_state::AppState;
pub use state::security_config::SecurityConfig;

// Prelude for test convenience
pub mod prelude {
    pub use super::auth::jwt::*;
    pub use super::config::db::*;
    pub use super::config::game::*;
    pub use super::domain::*;
    pub use super::error::*;
    pub use super::infra::state::*;
    pub use super::services::*;
    pub use super::state::app_state::*;
    pub use super::state::security_config::*;
    pub use super::store::*;
}

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    backend_test_support::logging::init();
}
