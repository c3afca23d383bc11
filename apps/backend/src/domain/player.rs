use serde::{Deserialize, Serialize};

use crate::domain::ids::PlayerId;
use crate::domain::rules::{letter_at, letters_to_eliminate};

/// Identity snapshot taken from the directory when an invite is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
}

/// A player seated in a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Prefix of the penalty word charged so far, e.g. "SK".
    pub letters: String,
}

impl Player {
    pub fn from_snapshot(snapshot: &PlayerSnapshot) -> Self {
        Self {
            id: snapshot.id.clone(),
            name: snapshot.name.clone(),
            letters: String::new(),
        }
    }

    pub fn is_eliminated(&self) -> bool {
        self.letters.chars().count() >= letters_to_eliminate()
    }

    /// Charge the next letter. Returns `true` when this letter completes the word.
    /// A player already holding the full word is left untouched.
    pub fn charge_letter(&mut self) -> bool {
        match letter_at(self.letters.chars().count()) {
            Some(letter) => {
                self.letters.push(letter);
                self.is_eliminated()
            }
            None => false,
        }
    }
}
