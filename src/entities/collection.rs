use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::define_criteria;
use crate::filter::{BooleanFilter, RangeFilter, StringFilter};
use crate::schema::EntitySchema;

/// A user's named shelf of books.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "collection")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub owner_login: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::collection_book::Entity")]
    CollectionBook,
}

impl Related<super::collection_book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CollectionBook.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

define_criteria! {
    /// Filters accepted by `GET /api/collections`.
    pub struct CollectionCriteria for Entity, schema = schema {
        id: RangeFilter<i32>,
        name: StringFilter,
        description: StringFilter,
        is_public: BooleanFilter,
        owner_login: StringFilter,
        book_id: RangeFilter<i32>,
    }
}

static SCHEMA: LazyLock<EntitySchema<Entity>> = LazyLock::new(|| {
    EntitySchema::<Entity>::new()
        .column("id", Column::Id)
        .column("name", Column::Name)
        .column("description", Column::Description)
        .column("is_public", Column::IsPublic)
        .column("owner_login", Column::OwnerLogin)
        .join(
            "book_id",
            || Relation::CollectionBook.def(),
            super::collection_book::Column::BookId,
        )
});

#[must_use]
pub fn schema() -> &'static EntitySchema<Entity> {
    &SCHEMA
}
