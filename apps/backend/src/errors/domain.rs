//! Domain-level error type used across the engine, store and services.
//!
//! This error type is HTTP- and DB-agnostic. Handlers return
//! `Result<T, crate::error::AppError>` and convert from `DomainError`
//! via `From<DomainError> for AppError`.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Input/precondition violations a client can recover from by re-reading state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    InvalidParticipantCount,
    NotAParticipant,
    WrongPhase,
    NotYourTurn,
    NotExecutor,
    NotEligibleVoter,
    InvalidTrickName,
    Other(String),
}

/// Semantic conflicts with the current record state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    InviteNotPending,
    TrickAlreadyEstablished,
    AlreadyVoted,
    /// Conditional write lost against a concurrent writer.
    ConcurrentModification,
    /// Insert of a document id that already exists.
    DuplicateDocument,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Invite,
    Match,
    Ranking,
    Other(String),
}

/// Infra error kinds to distinguish operational failures
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    PersistenceUnavailable,
    Timeout,
    DataCorruption,
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Input/user validation or game-rule precondition violation
    Validation(ValidationKind, String),
    /// Semantic conflict
    Conflict(ConflictKind, String),
    /// Missing resource in domain terms
    NotFound(NotFoundKind, String),
    /// Infrastructure/operational failures
    Infra(InfraErrorKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "validation {kind:?}: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::Infra(kind, d) => write!(f, "infra {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra(kind, detail.into())
    }

    pub fn wrong_phase(detail: impl Into<String>) -> Self {
        Self::validation(ValidationKind::WrongPhase, detail)
    }

    pub fn is_optimistic_conflict(&self) -> bool {
        matches!(
            self,
            DomainError::Conflict(ConflictKind::ConcurrentModification, _)
        )
    }

    /// True for errors that say nothing about game state and may be retried as-is.
    pub fn is_retryable_infra(&self) -> bool {
        matches!(
            self,
            DomainError::Infra(InfraErrorKind::PersistenceUnavailable, _)
                | DomainError::Infra(InfraErrorKind::Timeout, _)
        )
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::infra(
            InfraErrorKind::DataCorruption,
            format!("document (de)serialization failed: {e}"),
        )
    }
}
