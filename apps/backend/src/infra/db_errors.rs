//! SeaORM -> DomainError translation helpers.
//!
//! The SQL store converts every `sea_orm::DbErr` here; higher layers only see
//! `DomainError`, and raw driver messages never reach a client.

use tracing::{error, warn};

use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind};
use crate::trace_ctx;

fn mentions_sqlstate(msg: &str, code: &str) -> bool {
    msg.contains(code) || msg.contains(&format!("SQLSTATE({code})"))
}

fn is_unique_violation(msg: &str) -> bool {
    mentions_sqlstate(msg, "23505")
        || msg.contains("duplicate key value violates unique constraint")
        || msg.contains("UNIQUE constraint failed")
}

#[derive(serde::Deserialize)]
struct LockInfo {
    collection: String,
    id: String,
    expected: i64,
    actual: Option<i64>,
}

/// Translate a `DbErr` into a `DomainError` with sanitized detail.
pub fn map_db_err(e: sea_orm::DbErr) -> DomainError {
    let error_msg = e.to_string();
    let trace_id = trace_ctx::trace_id();

    match &e {
        sea_orm::DbErr::Custom(msg) if msg.starts_with("OPTIMISTIC_LOCK:") => {
            let info = msg
                .strip_prefix("OPTIMISTIC_LOCK:")
                .and_then(|json| serde_json::from_str::<LockInfo>(json).ok());
            return match info {
                Some(info) => {
                    warn!(
                        trace_id = %trace_id,
                        collection = %info.collection,
                        id = %info.id,
                        expected = info.expected,
                        actual = ?info.actual,
                        "Optimistic lock conflict detected"
                    );
                    DomainError::conflict(
                        ConflictKind::ConcurrentModification,
                        format!(
                            "{} document {} was modified concurrently (expected version {}); re-read and retry",
                            info.collection, info.id, info.expected
                        ),
                    )
                }
                None => {
                    warn!(trace_id = %trace_id, "Optimistic lock conflict detected (version info unavailable)");
                    DomainError::conflict(
                        ConflictKind::ConcurrentModification,
                        "Document was modified concurrently; re-read and retry",
                    )
                }
            };
        }
        sea_orm::DbErr::ConnectionAcquire(_) | sea_orm::DbErr::Conn(_) => {
            warn!(trace_id = %trace_id, raw_error = %error_msg, "Document store unavailable");
            return DomainError::infra(
                InfraErrorKind::PersistenceUnavailable,
                "Document store unavailable",
            );
        }
        _ => {}
    }

    if is_unique_violation(&error_msg) {
        warn!(trace_id = %trace_id, raw_error = %error_msg, "Document id already exists");
        return DomainError::conflict(ConflictKind::DuplicateDocument, "Document already exists");
    }

    if error_msg.contains("timeout") || error_msg.contains("timed out") {
        warn!(trace_id = %trace_id, raw_error = %error_msg, "Document store timeout");
        return DomainError::infra(InfraErrorKind::Timeout, "Document store timeout");
    }

    if error_msg.contains("pool") || error_msg.contains("unavailable") {
        warn!(trace_id = %trace_id, raw_error = %error_msg, "Document store pool exhausted");
        return DomainError::infra(
            InfraErrorKind::PersistenceUnavailable,
            "Document store unavailable",
        );
    }

    error!(trace_id = %trace_id, raw_error = %error_msg, "Unhandled database error");
    DomainError::infra(
        InfraErrorKind::Other("DbErr".into()),
        "Document store operation failed",
    )
}
