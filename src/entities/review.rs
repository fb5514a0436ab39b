use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::define_criteria;
use crate::filter::{BooleanFilter, RangeFilter, StringFilter};
use crate::schema::EntitySchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "review")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub book_id: i32,
    pub user_login: String,
    pub title: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub spoiler: bool,
    pub created_date: NaiveDate,
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
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

define_criteria! {
    /// Filters accepted by `GET /api/reviews`.
    pub struct ReviewCriteria for Entity, schema = schema {
        id: RangeFilter<i32>,
        user_login: StringFilter,
        title: StringFilter,
        body: StringFilter,
        spoiler: BooleanFilter,
        created_date: RangeFilter<NaiveDate>,
        book_id: RangeFilter<i32>,
    }
}

static SCHEMA: LazyLock<EntitySchema<Entity>> = LazyLock::new(|| {
    EntitySchema::<Entity>::new()
        .column("id", Column::Id)
        .column("user_login", Column::UserLogin)
        .column("title", Column::Title)
        .column("body", Column::Body)
        .column("spoiler", Column::Spoiler)
        .column("created_date", Column::CreatedDate)
        .join("book_id", || Relation::Book.def(), super::book::Column::Id)
});

#[must_use]
pub fn schema() -> &'static EntitySchema<Entity> {
    &SCHEMA
}
