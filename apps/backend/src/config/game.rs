//! Game coordination settings.

use std::env;
use std::time::Duration;

use crate::domain::rules::DEFAULT_INVITE_TTL_SECS;
use crate::domain::vote::VotePolicy;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub invite_ttl: time::Duration,
    pub vote_policy: VotePolicy,
    /// Attempts at a conditional write before surfacing `ConcurrentModification`.
    pub max_commit_attempts: u32,
    /// `None` disables the background sweeper.
    pub sweep_interval: Option<Duration>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            invite_ttl: time::Duration::seconds(DEFAULT_INVITE_TTL_SECS),
            vote_policy: VotePolicy::Majority,
            max_commit_attempts: 5,
            sweep_interval: Some(Duration::from_secs(30)),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::config(format!("{name} is not a valid value: '{raw}'"))),
        Err(_) => Ok(None),
    }
}

impl GameConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let mut config = Self::default();

        if let Some(secs) = parse_var::<u32>("SKATE_INVITE_TTL_SECS")? {
            if secs == 0 {
                return Err(AppError::config("SKATE_INVITE_TTL_SECS must be positive"));
            }
            config.invite_ttl = time::Duration::seconds(i64::from(secs));
        }

        if let Ok(raw) = env::var("SKATE_VOTE_POLICY") {
            config.vote_policy = match raw.trim().to_ascii_lowercase().as_str() {
                "majority" => VotePolicy::Majority,
                "unanimous" => VotePolicy::Unanimous,
                other => {
                    return Err(AppError::config(format!(
                        "SKATE_VOTE_POLICY must be majority or unanimous; got '{other}'"
                    )))
                }
            };
        }

        if let Some(attempts) = parse_var::<u32>("SKATE_MAX_COMMIT_ATTEMPTS")? {
            config.max_commit_attempts = attempts.max(1);
        }

        if let Some(secs) = parse_var::<u64>("SKATE_SWEEP_INTERVAL_SECS")? {
            config.sweep_interval = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }
}
