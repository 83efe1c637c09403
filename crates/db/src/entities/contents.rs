//! Contents entity - the subject a review is written about.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of reviewable subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ContentsType {
    /// A book picked from the book search results.
    #[sea_orm(string_value = "book")]
    Book,
    /// Any other page submitted by URL.
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Canonical URL, unique when present.
    #[sea_orm(column_type = "Text", unique, nullable)]
    pub url: Option<String>,

    /// Display title. Several contents may share a title.
    #[sea_orm(column_type = "Text")]
    pub title: String,

    /// Preview image, at most 4096 characters.
    #[sea_orm(column_type = "Text", nullable)]
    pub thumbnail_url: Option<String>,

    /// ISBN for books; secondary dedup key.
    #[sea_orm(nullable)]
    pub book_isbn: Option<String>,

    pub contents_type: ContentsType,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::review::Entity")]
    Reviews,
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
