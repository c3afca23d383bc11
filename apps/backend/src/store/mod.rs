//! Document store boundary.
//!
//! Invites, matches and ranking records are stored as versioned JSON
//! documents. Every write is conditional: inserts must not collide and
//! updates must name the version they were computed from. A batch passed to
//! [`DocumentStore::apply`] commits entirely or not at all.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::errors::domain::DomainError;

pub mod memory;
pub mod sea;
pub mod typed;

pub use memory::MemoryStore;
pub use sea::SeaStore;
pub use typed::{Document, Versioned};

/// Capacity of the change feed; slow subscribers observe `Lagged`.
pub const CHANGE_FEED_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Invites,
    Matches,
    Rankings,
}

impl Collection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Collection::Invites => "invites",
            Collection::Matches => "matches",
            Collection::Rankings => "rankings",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredDoc {
    pub collection: Collection,
    pub id: String,
    pub version: i64,
    pub lookup_key: String,
    pub body: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DocWrite {
    /// Fails with `DuplicateDocument` if the id exists. Starts at version 1.
    Insert {
        collection: Collection,
        id: String,
        lookup_key: String,
        body: Value,
    },
    /// Fails with `ConcurrentModification` unless the stored version equals
    /// `expected_version`. Bumps the version by one.
    Update {
        collection: Collection,
        id: String,
        expected_version: i64,
        lookup_key: String,
        body: Value,
    },
}

impl DocWrite {
    pub fn target(&self) -> (Collection, &str) {
        match self {
            DocWrite::Insert { collection, id, .. } | DocWrite::Update { collection, id, .. } => {
                (*collection, id.as_str())
            }
        }
    }
}

/// Emitted once per committed document write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocChange {
    pub collection: Collection,
    pub id: String,
    pub version: i64,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<StoredDoc>, DomainError>;

    /// All documents in `collection` whose lookup key equals `key`, ordered by id.
    async fn find_by_key(
        &self,
        collection: Collection,
        key: &str,
    ) -> Result<Vec<StoredDoc>, DomainError>;

    async fn apply(&self, writes: Vec<DocWrite>) -> Result<Vec<DocChange>, DomainError>;

    fn subscribe(&self) -> broadcast::Receiver<DocChange>;
}
