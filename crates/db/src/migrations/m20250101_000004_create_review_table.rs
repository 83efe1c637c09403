//! Create review and review_category tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Review::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Review::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Review::ContentsId).string_len(32).not_null())
                    .col(ColumnDef::new(Review::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Review::Rating).small_integer().not_null())
                    .col(ColumnDef::new(Review::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Review::Text).text().not_null())
                    .col(ColumnDef::new(Review::IsActive).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(Review::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Review::UpdatedAt).timestamp_with_time_zone())
                    .check(Expr::col(Review::Rating).between(1, 5))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_contents")
                            .from(Review::Table, Review::ContentsId)
                            .to(Contents::Table, Contents::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_user")
                            .from(Review::Table, Review::UserId)
                            .to(User::Table, User::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: contents_id (other reviews of the same contents)
        manager
            .create_index(
                Index::create()
                    .name("idx_review_contents_id")
                    .table(Review::Table)
                    .col(Review::ContentsId)
                    .to_owned(),
            )
            .await?;

        // Index: user_id (my reviews, user page)
        manager
            .create_index(
                Index::create()
                    .name("idx_review_user_id")
                    .table(Review::Table)
                    .col(Review::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ReviewCategory::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ReviewCategory::ReviewId).string_len(32).not_null())
                    .col(ColumnDef::new(ReviewCategory::CategoryId).integer().not_null())
                    .col(
                        ColumnDef::new(ReviewCategory::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .primary_key(
                        Index::create()
                            .col(ReviewCategory::ReviewId)
                            .col(ReviewCategory::CategoryId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_category_review")
                            .from(ReviewCategory::Table, ReviewCategory::ReviewId)
                            .to(Review::Table, Review::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_category_category")
                            .from(ReviewCategory::Table, ReviewCategory::CategoryId)
                            .to(Category::Table, Category::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: category_id (per-category listing)
        manager
            .create_index(
                Index::create()
                    .name("idx_review_category_category_id")
                    .table(ReviewCategory::Table)
                    .col(ReviewCategory::CategoryId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReviewCategory::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Review::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Review {
    Table,
    Id,
    ContentsId,
    UserId,
    Rating,
    Title,
    Text,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ReviewCategory {
    Table,
    ReviewId,
    CategoryId,
    Position,
}

#[derive(Iden)]
enum Contents {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Category {
    Table,
    Id,
}
