use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::define_criteria;
use crate::filter::RangeFilter;
use crate::schema::EntitySchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "book_genre")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub book_id: i32,
    pub genre_id: i32,
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
        belongs_to = "super::genre::Entity",
        from = "Column::GenreId",
        to = "super::genre::Column::Id",
        on_delete = "Cascade"
    )]
    Genre,
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl Related<super::genre::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Genre.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

define_criteria! {
    /// Filters accepted by `GET /api/book-genres`.
    pub struct BookGenreCriteria for Entity, schema = schema {
        id: RangeFilter<i32>,
        book_id: RangeFilter<i32>,
        genre_id: RangeFilter<i32>,
    }
}

static SCHEMA: LazyLock<EntitySchema<Entity>> = LazyLock::new(|| {
    EntitySchema::<Entity>::new()
        .column("id", Column::Id)
        .column("book_id", Column::BookId)
        .column("genre_id", Column::GenreId)
});

#[must_use]
pub fn schema() -> &'static EntitySchema<Entity> {
    &SCHEMA
}
