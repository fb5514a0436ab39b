use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::define_criteria;
use crate::filter::{RangeFilter, StringFilter};
use crate::schema::EntitySchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "author")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub nationality: Option<String>,
    pub birth_year: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::book::Entity")]
    Book,
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

define_criteria! {
    /// Filters accepted by `GET /api/authors`.
    pub struct AuthorCriteria for Entity, schema = schema {
        id: RangeFilter<i32>,
        name: StringFilter,
        nationality: StringFilter,
        birth_year: RangeFilter<i32>,
        book_id: RangeFilter<i32>,
    }
}

static SCHEMA: LazyLock<EntitySchema<Entity>> = LazyLock::new(|| {
    EntitySchema::<Entity>::new()
        .column("id", Column::Id)
        .column("name", Column::Name)
        .column("nationality", Column::Nationality)
        .column("birth_year", Column::BirthYear)
        .join("book_id", || Relation::Book.def(), super::book::Column::Id)
});

#[must_use]
pub fn schema() -> &'static EntitySchema<Entity> {
    &SCHEMA
}
