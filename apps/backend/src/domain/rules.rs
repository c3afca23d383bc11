//! Fixed game rules.

use unicode_normalization::UnicodeNormalization;

use crate::errors::domain::{DomainError, ValidationKind};

/// Letters are charged in this order; holding all of them means elimination.
pub const PENALTY_WORD: &str = "SKATE";

/// Players per match, creator included.
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;

/// Default invite time-to-live.
pub const DEFAULT_INVITE_TTL_SECS: i64 = 180;

pub const MAX_TRICK_NAME_CHARS: usize = 64;

/// Number of letters a player can hold before being eliminated.
#[inline]
pub fn letters_to_eliminate() -> usize {
    PENALTY_WORD.chars().count()
}

/// Letter charged for a player's `held + 1`-th penalty, or `None` once the
/// word is complete.
#[inline]
pub fn letter_at(held: usize) -> Option<char> {
    PENALTY_WORD.chars().nth(held)
}

/// Trim and validate a proposed trick name, returning the display form.
pub fn clean_trick_name(raw: &str) -> Result<String, DomainError> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return Err(DomainError::validation(
            ValidationKind::InvalidTrickName,
            "Trick name must not be empty",
        ));
    }
    if collapsed.chars().count() > MAX_TRICK_NAME_CHARS {
        return Err(DomainError::validation(
            ValidationKind::InvalidTrickName,
            format!("Trick name must be at most {MAX_TRICK_NAME_CHARS} characters"),
        ));
    }
    Ok(collapsed)
}

/// Comparison key used for duplicate detection: NFKC, lowercase, single spaces.
pub fn trick_key(name: &str) -> String {
    name.nfkc()
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
