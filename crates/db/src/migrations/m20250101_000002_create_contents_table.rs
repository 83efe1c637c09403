//! Create contents table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Contents::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Contents::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Contents::Url).text())
                    .col(ColumnDef::new(Contents::Title).text().not_null())
                    .col(ColumnDef::new(Contents::ThumbnailUrl).text())
                    .col(ColumnDef::new(Contents::BookIsbn).string_len(32))
                    .col(ColumnDef::new(Contents::ContentsType).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Contents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: url - concurrent inserts for one URL collide here
        manager
            .create_index(
                Index::create()
                    .name("idx_contents_url")
                    .table(Contents::Table)
                    .col(Contents::Url)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Partial unique index: book_isbn, so ISBN-only books collide too
        manager
            .get_connection()
            .execute_unprepared(
                r"
                CREATE UNIQUE INDEX IF NOT EXISTS idx_contents_book_isbn
                    ON contents (book_isbn)
                    WHERE book_isbn IS NOT NULL;
                ",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Contents::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Contents {
    Table,
    Id,
    Url,
    Title,
    ThumbnailUrl,
    BookIsbn,
    ContentsType,
    CreatedAt,
}
