//! Category entity - a tag attached to reviews.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Categories are seeded by migration and read-only at runtime.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "category")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::review_category::Entity")]
    ReviewCategory,
}

impl Related<super::review_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReviewCategory.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        super::review_category::Relation::Review.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::review_category::Relation::Category.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
