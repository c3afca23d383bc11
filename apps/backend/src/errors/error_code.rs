//! Error codes for the skate backend API.
//!
//! Every code that can appear in a problem+json body is declared here; never
//! pass ad-hoc strings as error codes. Codes are SCREAMING_SNAKE_CASE and map
//! 1:1 to the strings clients see.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Authentication
    /// Authentication required
    Unauthorized,
    /// Missing or malformed Bearer token
    UnauthorizedMissingBearer,
    /// Invalid JWT token
    UnauthorizedInvalidJwt,
    /// JWT token has expired
    UnauthorizedExpiredJwt,

    // Invite phase
    /// Participant list outside 2..=4 players or containing unavailable players
    InvalidParticipantCount,
    /// Caller is not listed on the invite
    NotAParticipant,
    /// Invite is no longer waiting for responses (or has expired)
    InviteNotPending,

    // Match phase
    /// Operation not legal in the match's current phase
    WrongPhase,
    /// Caller does not hold the turn
    NotYourTurn,
    /// Caller is not the player whose attempt is live
    NotExecutor,
    /// Trick was already established earlier in this match
    TrickAlreadyEstablished,
    /// Caller may not vote on the current attempt
    NotEligibleVoter,
    /// Caller already voted on the current attempt
    AlreadyVoted,
    /// Trick name empty or too long
    InvalidTrickName,

    // Request validation
    /// General validation error
    ValidationError,
    /// General bad request error
    BadRequest,

    // Resource not found
    InviteNotFound,
    MatchNotFound,
    RankingNotFound,
    /// General not found error
    NotFound,

    // Concurrency / storage
    /// Conditional write lost to a concurrent writer; re-read and decide
    ConcurrentModification,
    /// Document id already exists
    DuplicateDocument,
    /// Generic conflict (fallback for unmatched conflicts)
    Conflict,
    /// Document store unavailable; retryable
    PersistenceUnavailable,
    /// Document store timed out; retryable
    PersistenceTimeout,
    /// Stored document could not be decoded
    DataCorruption,

    /// Internal server error
    Internal,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// Every code, for uniqueness checks and documentation.
    pub const ALL: &'static [ErrorCode] = &[
        Self::Unauthorized,
        Self::UnauthorizedMissingBearer,
        Self::UnauthorizedInvalidJwt,
        Self::UnauthorizedExpiredJwt,
        Self::InvalidParticipantCount,
        Self::NotAParticipant,
        Self::InviteNotPending,
        Self::WrongPhase,
        Self::NotYourTurn,
        Self::NotExecutor,
        Self::TrickAlreadyEstablished,
        Self::NotEligibleVoter,
        Self::AlreadyVoted,
        Self::InvalidTrickName,
        Self::ValidationError,
        Self::BadRequest,
        Self::InviteNotFound,
        Self::MatchNotFound,
        Self::RankingNotFound,
        Self::NotFound,
        Self::ConcurrentModification,
        Self::DuplicateDocument,
        Self::Conflict,
        Self::PersistenceUnavailable,
        Self::PersistenceTimeout,
        Self::DataCorruption,
        Self::Internal,
        Self::ConfigError,
    ];

    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::UnauthorizedMissingBearer => "UNAUTHORIZED_MISSING_BEARER",
            Self::UnauthorizedInvalidJwt => "UNAUTHORIZED_INVALID_JWT",
            Self::UnauthorizedExpiredJwt => "UNAUTHORIZED_EXPIRED_JWT",

            Self::InvalidParticipantCount => "INVALID_PARTICIPANT_COUNT",
            Self::NotAParticipant => "NOT_A_PARTICIPANT",
            Self::InviteNotPending => "INVITE_NOT_PENDING",

            Self::WrongPhase => "WRONG_PHASE",
            Self::NotYourTurn => "NOT_YOUR_TURN",
            Self::NotExecutor => "NOT_EXECUTOR",
            Self::TrickAlreadyEstablished => "TRICK_ALREADY_ESTABLISHED",
            Self::NotEligibleVoter => "NOT_ELIGIBLE_VOTER",
            Self::AlreadyVoted => "ALREADY_VOTED",
            Self::InvalidTrickName => "INVALID_TRICK_NAME",

            Self::ValidationError => "VALIDATION_ERROR",
            Self::BadRequest => "BAD_REQUEST",

            Self::InviteNotFound => "INVITE_NOT_FOUND",
            Self::MatchNotFound => "MATCH_NOT_FOUND",
            Self::RankingNotFound => "RANKING_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::DuplicateDocument => "DUPLICATE_DOCUMENT",
            Self::Conflict => "CONFLICT",
            Self::PersistenceUnavailable => "PERSISTENCE_UNAVAILABLE",
            Self::PersistenceTimeout => "PERSISTENCE_TIMEOUT",
            Self::DataCorruption => "DATA_CORRUPTION",

            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
