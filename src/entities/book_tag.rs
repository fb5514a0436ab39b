use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::define_criteria;
use crate::filter::RangeFilter;
use crate::schema::EntitySchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "book_tag")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub book_id: i32,
    pub tag_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::book::Entity",
        from = "Column::BookId",
        to = "super::book::Column::Id",
        on_delete = "Cascade"
    )]
    Book,
    #[sea_orm(
        belongs_to = "super::tag::Entity",
        from = "Column::TagId",
        to = "super::tag::Column::Id",
        on_delete = "Cascade"
    )]
    Tag,
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tag.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

define_criteria! {
    /// Filters accepted by `GET /api/book-tags`.
    pub struct BookTagCriteria for Entity, schema = schema {
        id: RangeFilter<i32>,
        book_id: RangeFilter<i32>,
        tag_id: RangeFilter<i32>,
    }
}

static SCHEMA: LazyLock<EntitySchema<Entity>> = LazyLock::new(|| {
    EntitySchema::<Entity>::new()
        .column("id", Column::Id)
        .column("book_id", Column::BookId)
        .column("tag_id", Column::TagId)
});

#[must_use]
pub fn schema() -> &'static EntitySchema<Entity> {
    &SCHEMA
}
