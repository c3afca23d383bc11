//! Optimistic read-modify-write over a single document.
//!
//! A mutation loads the document, runs a pure transition against it and
//! writes the result conditioned on the version it read, together with any
//! extra writes the transition asked for. A lost race reloads and runs the
//! transition again from scratch; it never blindly reapplies a stale result.

use tracing::{debug, warn};

use crate::errors::domain::{ConflictKind, DomainError};
use crate::store::typed::load;
use crate::store::{DocWrite, DocumentStore, Document, Versioned};

/// What a transition decided.
pub struct Step<R> {
    pub result: R,
    /// Whether the target document itself changed.
    pub write: bool,
    /// Additional writes committed atomically with the target.
    pub extra: Vec<DocWrite>,
}

impl<R> Step<R> {
    pub fn write(result: R) -> Self {
        Self {
            result,
            write: true,
            extra: Vec::new(),
        }
    }

    /// Nothing to persist.
    pub fn skip(result: R) -> Self {
        Self {
            result,
            write: false,
            extra: Vec::new(),
        }
    }

    pub fn and(mut self, write: DocWrite) -> Self {
        self.extra.push(write);
        self
    }
}

#[derive(Debug)]
pub struct Committed<T, R> {
    pub doc: Versioned<T>,
    pub result: R,
}

#[derive(Debug)]
pub enum MutationError<T> {
    /// The transition refused, or every commit attempt lost a race. Carries
    /// the latest state so callers can hand it back to the client.
    Rejected {
        error: DomainError,
        current: Versioned<T>,
    },
    /// Missing document or store failure.
    Failed(DomainError),
}

impl<T> From<DomainError> for MutationError<T> {
    fn from(e: DomainError) -> Self {
        MutationError::Failed(e)
    }
}

pub async fn mutate<T, R, F>(
    store: &dyn DocumentStore,
    id: &str,
    max_attempts: u32,
    missing: impl Fn() -> DomainError,
    mut transition: F,
) -> Result<Committed<T, R>, MutationError<T>>
where
    T: Document + Clone,
    F: FnMut(&mut T) -> Result<Step<R>, DomainError>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        let current = load::<T>(store, id).await?.ok_or_else(&missing)?;

        let mut next = current.doc.clone();
        let step = match transition(&mut next) {
            Ok(step) => step,
            Err(error) => return Err(MutationError::Rejected { error, current }),
        };

        if !step.write && step.extra.is_empty() {
            return Ok(Committed {
                doc: current,
                result: step.result,
            });
        }

        let mut writes = Vec::with_capacity(step.extra.len() + 1);
        if step.write {
            writes.push(next.update(current.version)?);
        }
        writes.extend(step.extra);

        match store.apply(writes).await {
            Ok(_) => {
                let version = if step.write {
                    current.version + 1
                } else {
                    current.version
                };
                return Ok(Committed {
                    doc: Versioned { doc: next, version },
                    result: step.result,
                });
            }
            Err(e) if e.is_optimistic_conflict() && attempt < max_attempts => {
                debug!(
                    collection = T::COLLECTION.as_str(),
                    id,
                    attempt,
                    "conditional write lost a race; reloading"
                );
            }
            Err(e) if e.is_optimistic_conflict() => {
                warn!(
                    collection = T::COLLECTION.as_str(),
                    id,
                    attempts = attempt,
                    "giving up after repeated write conflicts"
                );
                let current = load::<T>(store, id).await?.ok_or_else(&missing)?;
                return Err(MutationError::Rejected {
                    error: DomainError::conflict(
                        ConflictKind::ConcurrentModification,
                        format!(
                            "{} document {id} kept changing underneath this operation; re-read and decide",
                            T::COLLECTION.as_str()
                        ),
                    ),
                    current,
                });
            }
            Err(e) => return Err(MutationError::Failed(e)),
        }
    }
}
