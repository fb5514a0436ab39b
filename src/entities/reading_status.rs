use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::define_criteria;
use crate::filter::{RangeFilter, StringFilter};
use crate::schema::EntitySchema;

/// Where one user is with one book: `WANT_TO_READ`, `READING` or `READ`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reading_status")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub book_id: i32,
    pub user_login: String,
    pub status: String,
    /// Percentage read, 0 to 100.
    pub progress: Option<i32>,
    pub started_date: Option<NaiveDate>,
    pub finished_date: Option<NaiveDate>,
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
    /// Filters accepted by `GET /api/reading-statuses`.
    pub struct ReadingStatusCriteria for Entity, schema = schema {
        id: RangeFilter<i32>,
        status: StringFilter,
        user_login: StringFilter,
        progress: RangeFilter<i32>,
        started_date: RangeFilter<NaiveDate>,
        finished_date: RangeFilter<NaiveDate>,
        book_id: RangeFilter<i32>,
    }
}

static SCHEMA: LazyLock<EntitySchema<Entity>> = LazyLock::new(|| {
    EntitySchema::<Entity>::new()
        .column("id", Column::Id)
        .column("status", Column::Status)
        .column("user_login", Column::UserLogin)
        .column("progress", Column::Progress)
        .column("started_date", Column::StartedDate)
        .column("finished_date", Column::FinishedDate)
        .join("book_id", || Relation::Book.def(), super::book::Column::Id)
});

#[must_use]
pub fn schema() -> &'static EntitySchema<Entity> {
    &SCHEMA
}
