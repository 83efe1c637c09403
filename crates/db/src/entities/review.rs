//! Review entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "review")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub contents_id: String,

    /// Author.
    pub user_id: String,

    /// 1 to 5.
    pub rating: i16,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub text: String,

    /// False once the author deletes the review. The row is kept.
    #[sea_orm(default_value = true)]
    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contents::Entity",
        from = "Column::ContentsId",
        to = "super::contents::Column::Id"
    )]
    Contents,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::review_category::Entity")]
    ReviewCategory,
}

impl Related<super::contents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contents.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::review_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReviewCategory.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        super::review_category::Relation::Category.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::review_category::Relation::Review.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
