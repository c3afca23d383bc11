use std::env;

use crate::error::AppError;

/// Database profile for the Postgres backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbProfile {
    /// Production database profile
    Prod,
    /// Test database profile - enforces safety rules
    Test,
}

/// Which document store the process runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    /// `None` means an in-memory SQLite database.
    Sqlite { path: Option<String> },
    Postgres(DbProfile),
}

impl StoreBackend {
    /// Read `SKATE_STORE` (`memory` | `sqlite` | `postgres`, default `memory`).
    pub fn from_env() -> Result<Self, AppError> {
        let raw = env::var("SKATE_STORE").unwrap_or_else(|_| "memory".to_string());
        match raw.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "sqlite" => Ok(StoreBackend::Sqlite {
                path: env::var("SQLITE_PATH").ok().filter(|p| !p.trim().is_empty()),
            }),
            "postgres" => Ok(StoreBackend::Postgres(DbProfile::Prod)),
            other => Err(AppError::config(format!(
                "SKATE_STORE must be one of memory, sqlite, postgres; got '{other}'"
            ))),
        }
    }

    /// Connection URL, or `None` for the in-process store.
    pub fn url(&self) -> Result<Option<String>, AppError> {
        match self {
            StoreBackend::Memory => Ok(None),
            StoreBackend::Sqlite { path } => Ok(Some(sqlite_url(path.as_deref()))),
            StoreBackend::Postgres(profile) => postgres_url(*profile).map(Some),
        }
    }
}

pub fn sqlite_url(path: Option<&str>) -> String {
    match path {
        Some(path) => format!("sqlite://{path}?mode=rwc"),
        None => "sqlite::memory:".to_string(),
    }
}

/// Builds a Postgres URL from environment variables for the given profile
pub fn postgres_url(profile: DbProfile) -> Result<String, AppError> {
    let host = env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = env::var("POSTGRES_PORT").unwrap_or_else(|_| "5432".to_string());
    let db_name = db_name(profile)?;
    let username = must_var("APP_DB_USER")?;
    let password = must_var("APP_DB_PASSWORD")?;

    Ok(format!(
        "postgresql://{username}:{password}@{host}:{port}/{db_name}"
    ))
}

fn db_name(profile: DbProfile) -> Result<String, AppError> {
    match profile {
        DbProfile::Prod => must_var("PROD_DB"),
        DbProfile::Test => {
            let db_name = must_var("TEST_DB")?;
            if !db_name.ends_with("_test") {
                return Err(AppError::config(format!(
                    "Test profile requires database name to end with '_test', but got: '{db_name}'"
                )));
            }
            Ok(db_name)
        }
    }
}

/// Get required environment variable or return error
pub(crate) fn must_var(name: &str) -> Result<String, AppError> {
    env::var(name)
        .map_err(|_| AppError::config(format!("Required environment variable '{name}' is not set")))
}
