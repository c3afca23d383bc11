// Mapping from domain errors to HTTP errors, one family at a time.
use actix_web::http::StatusCode;

use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::errors::ErrorCode;
use crate::AppError;

#[test]
fn request_shape_violations_are_400() {
    for (kind, code) in [
        (
            ValidationKind::InvalidParticipantCount,
            ErrorCode::InvalidParticipantCount,
        ),
        (ValidationKind::NotAParticipant, ErrorCode::NotAParticipant),
        (ValidationKind::InvalidTrickName, ErrorCode::InvalidTrickName),
        (
            ValidationKind::Other("X".into()),
            ErrorCode::ValidationError,
        ),
    ] {
        let app: AppError = DomainError::validation(kind, "bad").into();
        assert_eq!(app.code(), code);
        assert_eq!(app.status(), StatusCode::BAD_REQUEST);
    }
}

#[test]
fn turn_preconditions_are_422() {
    for kind in [
        ValidationKind::NotExecutor,
        ValidationKind::NotEligibleVoter,
    ] {
        let app: AppError = DomainError::validation(kind, "nope").into();
        assert_eq!(app.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}

#[test]
fn remaining_conflicts_are_409() {
    for (kind, code) in [
        (
            ConflictKind::TrickAlreadyEstablished,
            ErrorCode::TrickAlreadyEstablished,
        ),
        (ConflictKind::DuplicateDocument, ErrorCode::DuplicateDocument),
        (ConflictKind::Other("X".into()), ErrorCode::Conflict),
    ] {
        let app: AppError = DomainError::conflict(kind, "taken").into();
        assert_eq!(app.code(), code);
        assert_eq!(app.status(), StatusCode::CONFLICT);
    }
}

#[test]
fn not_found_kinds_keep_their_codes() {
    for (kind, code) in [
        (NotFoundKind::Invite, "INVITE_NOT_FOUND"),
        (NotFoundKind::Match, "MATCH_NOT_FOUND"),
        (NotFoundKind::Ranking, "RANKING_NOT_FOUND"),
        (NotFoundKind::Other("venue".into()), "NOT_FOUND"),
    ] {
        let app: AppError = DomainError::not_found(kind, "gone").into();
        assert_eq!(app.code().as_str(), code);
        assert_eq!(app.status(), StatusCode::NOT_FOUND);
    }
}

#[test]
fn infra_failures_split_between_503_and_500() {
    let timeout: AppError = DomainError::infra(InfraErrorKind::Timeout, "slow").into();
    assert_eq!(timeout.code(), ErrorCode::PersistenceTimeout);
    assert_eq!(timeout.status(), StatusCode::SERVICE_UNAVAILABLE);

    let corrupt: AppError = DomainError::infra(InfraErrorKind::DataCorruption, "bad json").into();
    assert_eq!(corrupt.code(), ErrorCode::DataCorruption);
    assert_eq!(corrupt.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let other: AppError = DomainError::infra(InfraErrorKind::Other("io".into()), "boom").into();
    assert_eq!(other.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn state_survives_conversion_from_domain() {
    let app = AppError::from(DomainError::validation(ValidationKind::WrongPhase, "voting"))
        .with_state(serde_json::json!({"phase": "voting"}));
    assert_eq!(app.code(), ErrorCode::WrongPhase);
    assert_eq!(app.state(), Some(&serde_json::json!({"phase": "voting"})));
}
