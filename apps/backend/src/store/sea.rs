//! SeaORM-backed document store over the `documents` table.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use time::OffsetDateTime;
use tokio::sync::broadcast;
use tracing::debug;

use super::{Collection, DocChange, DocWrite, DocumentStore, StoredDoc, CHANGE_FEED_CAPACITY};
use crate::entities::documents;
use crate::errors::domain::{DomainError, InfraErrorKind};
use crate::infra::db_errors::map_db_err;

pub struct SeaStore {
    db: DatabaseConnection,
    changes: broadcast::Sender<DocChange>,
}

impl SeaStore {
    pub fn new(db: DatabaseConnection) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self { db, changes }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

fn parse_collection(raw: &str) -> Result<Collection, DomainError> {
    match raw {
        "invites" => Ok(Collection::Invites),
        "matches" => Ok(Collection::Matches),
        "rankings" => Ok(Collection::Rankings),
        other => Err(DomainError::infra(
            InfraErrorKind::DataCorruption,
            format!("unknown collection '{other}' in documents table"),
        )),
    }
}

fn from_row(row: documents::Model) -> Result<StoredDoc, DomainError> {
    Ok(StoredDoc {
        collection: parse_collection(&row.collection)?,
        body: serde_json::from_str(&row.body)?,
        id: row.id,
        version: row.version,
        lookup_key: row.lookup_key,
    })
}

async fn write_one<C: ConnectionTrait>(
    conn: &C,
    write: DocWrite,
    now: OffsetDateTime,
) -> Result<DocChange, DbErr> {
    match write {
        DocWrite::Insert {
            collection,
            id,
            lookup_key,
            body,
        } => {
            documents::ActiveModel {
                collection: Set(collection.as_str().to_string()),
                id: Set(id.clone()),
                version: Set(1),
                lookup_key: Set(lookup_key),
                body: Set(body.to_string()),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(conn)
            .await?;
            Ok(DocChange {
                collection,
                id,
                version: 1,
            })
        }
        DocWrite::Update {
            collection,
            id,
            expected_version,
            lookup_key,
            body,
        } => {
            let result = documents::Entity::update_many()
                .col_expr(documents::Column::Version, Expr::value(expected_version + 1))
                .col_expr(documents::Column::LookupKey, Expr::value(lookup_key))
                .col_expr(documents::Column::Body, Expr::value(body.to_string()))
                .col_expr(documents::Column::UpdatedAt, Expr::value(now))
                .filter(documents::Column::Collection.eq(collection.as_str()))
                .filter(documents::Column::Id.eq(id.as_str()))
                .filter(documents::Column::Version.eq(expected_version))
                .exec(conn)
                .await?;

            if result.rows_affected == 0 {
                let actual = documents::Entity::find_by_id((collection.as_str().to_string(), id.clone()))
                    .one(conn)
                    .await?
                    .map(|row| row.version);
                let payload = serde_json::json!({
                    "collection": collection.as_str(),
                    "id": id,
                    "expected": expected_version,
                    "actual": actual,
                });
                return Err(DbErr::Custom(format!("OPTIMISTIC_LOCK:{payload}")));
            }

            Ok(DocChange {
                collection,
                id,
                version: expected_version + 1,
            })
        }
    }
}

#[async_trait]
impl DocumentStore for SeaStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<StoredDoc>, DomainError> {
        documents::Entity::find_by_id((collection.as_str().to_string(), id.to_string()))
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .map(from_row)
            .transpose()
    }

    async fn find_by_key(
        &self,
        collection: Collection,
        key: &str,
    ) -> Result<Vec<StoredDoc>, DomainError> {
        documents::Entity::find()
            .filter(documents::Column::Collection.eq(collection.as_str()))
            .filter(documents::Column::LookupKey.eq(key))
            .order_by_asc(documents::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(from_row)
            .collect()
    }

    async fn apply(&self, writes: Vec<DocWrite>) -> Result<Vec<DocChange>, DomainError> {
        let now = OffsetDateTime::now_utc();
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let mut changes = Vec::with_capacity(writes.len());
        for write in writes {
            // Dropping `txn` on error rolls the batch back.
            changes.push(write_one(&txn, write, now).await.map_err(map_db_err)?);
        }
        txn.commit().await.map_err(map_db_err)?;

        for change in &changes {
            debug!(collection = change.collection.as_str(), id = %change.id, version = change.version, "document committed");
            let _ = self.changes.send(change.clone());
        }
        Ok(changes)
    }

    fn subscribe(&self) -> broadcast::Receiver<DocChange> {
        self.changes.subscribe()
    }
}
