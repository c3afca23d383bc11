//! In-process document store.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::debug;

use super::{Collection, DocChange, DocWrite, DocumentStore, StoredDoc, CHANGE_FEED_CAPACITY};
use crate::errors::domain::{ConflictKind, DomainError};

type Key = (Collection, String);

pub struct MemoryStore {
    docs: RwLock<BTreeMap<Key, StoredDoc>>,
    changes: broadcast::Sender<DocChange>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            docs: RwLock::new(BTreeMap::new()),
            changes,
        }
    }

    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }
}

pub(crate) fn duplicate(collection: Collection, id: &str) -> DomainError {
    DomainError::conflict(
        ConflictKind::DuplicateDocument,
        format!("{} document {id} already exists", collection.as_str()),
    )
}

pub(crate) fn version_conflict(
    collection: Collection,
    id: &str,
    expected: i64,
    actual: Option<i64>,
) -> DomainError {
    let actual = actual.map_or_else(|| "missing".to_string(), |v| v.to_string());
    DomainError::conflict(
        ConflictKind::ConcurrentModification,
        format!(
            "{} document {id} was modified concurrently (expected version {expected}, actual {actual}); re-read and retry",
            collection.as_str()
        ),
    )
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<StoredDoc>, DomainError> {
        Ok(self.docs.read().get(&(collection, id.to_string())).cloned())
    }

    async fn find_by_key(
        &self,
        collection: Collection,
        key: &str,
    ) -> Result<Vec<StoredDoc>, DomainError> {
        Ok(self
            .docs
            .read()
            .range((collection, String::new())..)
            .take_while(|((c, _), _)| *c == collection)
            .filter(|(_, doc)| doc.lookup_key == key)
            .map(|(_, doc)| doc.clone())
            .collect())
    }

    async fn apply(&self, writes: Vec<DocWrite>) -> Result<Vec<DocChange>, DomainError> {
        let changes = {
            let mut docs = self.docs.write();

            // Validate the whole batch before touching anything.
            let mut touched = HashSet::new();
            for write in &writes {
                let (collection, id) = write.target();
                if !touched.insert((collection, id.to_string())) {
                    return Err(DomainError::conflict(
                        ConflictKind::Other("BatchTarget".into()),
                        format!("{} document {id} written twice in one batch", collection.as_str()),
                    ));
                }
                let current = docs.get(&(collection, id.to_string())).map(|d| d.version);
                match write {
                    DocWrite::Insert { .. } if current.is_some() => {
                        return Err(duplicate(collection, id));
                    }
                    DocWrite::Update {
                        expected_version, ..
                    } if current != Some(*expected_version) => {
                        return Err(version_conflict(collection, id, *expected_version, current));
                    }
                    _ => {}
                }
            }

            let mut changes = Vec::with_capacity(writes.len());
            for write in writes {
                let doc = match write {
                    DocWrite::Insert {
                        collection,
                        id,
                        lookup_key,
                        body,
                    } => StoredDoc {
                        collection,
                        id,
                        version: 1,
                        lookup_key,
                        body,
                    },
                    DocWrite::Update {
                        collection,
                        id,
                        expected_version,
                        lookup_key,
                        body,
                    } => StoredDoc {
                        collection,
                        id,
                        version: expected_version + 1,
                        lookup_key,
                        body,
                    },
                };
                changes.push(DocChange {
                    collection: doc.collection,
                    id: doc.id.clone(),
                    version: doc.version,
                });
                docs.insert((doc.collection, doc.id.clone()), doc);
            }
            changes
        };

        for change in &changes {
            debug!(collection = change.collection.as_str(), id = %change.id, version = change.version, "document committed");
            // No subscribers is fine.
            let _ = self.changes.send(change.clone());
        }
        Ok(changes)
    }

    fn subscribe(&self) -> broadcast::Receiver<DocChange> {
        self.changes.subscribe()
    }
}
