//! Typed documents over the raw store.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Collection, DocWrite, DocumentStore, StoredDoc};
use crate::domain::invite::Invite;
use crate::domain::match_state::Match;
use crate::domain::ranking::RankingRecord;
use crate::errors::domain::DomainError;

pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: Collection;

    fn doc_id(&self) -> String;
    fn lookup_key(&self) -> String;

    fn insert(&self) -> Result<DocWrite, DomainError> {
        Ok(DocWrite::Insert {
            collection: Self::COLLECTION,
            id: self.doc_id(),
            lookup_key: self.lookup_key(),
            body: serde_json::to_value(self)?,
        })
    }

    fn update(&self, expected_version: i64) -> Result<DocWrite, DomainError> {
        Ok(DocWrite::Update {
            collection: Self::COLLECTION,
            id: self.doc_id(),
            expected_version,
            lookup_key: self.lookup_key(),
            body: serde_json::to_value(self)?,
        })
    }
}

impl Document for Invite {
    const COLLECTION: Collection = Collection::Invites;

    fn doc_id(&self) -> String {
        self.id.to_string()
    }

    fn lookup_key(&self) -> String {
        self.status.as_key().to_string()
    }
}

impl Document for Match {
    const COLLECTION: Collection = Collection::Matches;

    fn doc_id(&self) -> String {
        self.id.to_string()
    }

    fn lookup_key(&self) -> String {
        Match::lookup_key(self).to_string()
    }
}

/// Keyed by match id so a second record for the same match cannot be inserted.
impl Document for RankingRecord {
    const COLLECTION: Collection = Collection::Rankings;

    fn doc_id(&self) -> String {
        self.match_id.to_string()
    }

    fn lookup_key(&self) -> String {
        self.venue_id.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub doc: T,
    pub version: i64,
}

impl<T: Document> Versioned<T> {
    pub fn decode(raw: StoredDoc) -> Result<Self, DomainError> {
        Ok(Self {
            doc: serde_json::from_value(raw.body)?,
            version: raw.version,
        })
    }
}

pub async fn load<T: Document>(
    store: &dyn DocumentStore,
    id: &str,
) -> Result<Option<Versioned<T>>, DomainError> {
    store
        .get(T::COLLECTION, id)
        .await?
        .map(Versioned::decode)
        .transpose()
}

pub async fn load_by_key<T: Document>(
    store: &dyn DocumentStore,
    key: &str,
) -> Result<Vec<Versioned<T>>, DomainError> {
    store
        .find_by_key(T::COLLECTION, key)
        .await?
        .into_iter()
        .map(Versioned::decode)
        .collect()
}
