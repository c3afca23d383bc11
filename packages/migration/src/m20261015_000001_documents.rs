use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::{ColumnDef, Index, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Documents {
    Table,
    Collection,
    Id,
    Version,
    LookupKey,
    Body,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Documents::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Documents::Collection).string().not_null())
                    .col(ColumnDef::new(Documents::Id).string().not_null())
                    .col(ColumnDef::new(Documents::Version).big_integer().not_null())
                    .col(ColumnDef::new(Documents::LookupKey).string().not_null())
                    .col(ColumnDef::new(Documents::Body).text().not_null())
                    .col(
                        ColumnDef::new(Documents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Documents::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(Documents::Collection)
                            .col(Documents::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_documents_collection_lookup_key")
                    .table(Documents::Table)
                    .col(Documents::Collection)
                    .col(Documents::LookupKey)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("ix_documents_collection_lookup_key")
                    .table(Documents::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Documents::Table).to_owned())
            .await
    }
}
