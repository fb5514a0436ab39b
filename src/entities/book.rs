use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::define_criteria;
use crate::filter::{BooleanFilter, RangeFilter, StringFilter};
use crate::schema::EntitySchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "book")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub isbn: Option<String>,
    pub page_count: Option<i32>,
    pub published_date: Option<NaiveDate>,
    pub available: bool,
    pub author_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::author::Entity",
        from = "Column::AuthorId",
        to = "super::author::Column::Id"
    )]
    Author,
    #[sea_orm(has_many = "super::book_genre::Entity")]
    BookGenre,
    #[sea_orm(has_many = "super::book_tag::Entity")]
    BookTag,
    #[sea_orm(has_many = "super::collection_book::Entity")]
    CollectionBook,
    #[sea_orm(has_many = "super::review::Entity")]
    Review,
    #[sea_orm(has_many = "super::rating::Entity")]
    Rating,
    #[sea_orm(has_many = "super::reading_status::Entity")]
    ReadingStatus,
}

impl Related<super::author::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::book_genre::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookGenre.def()
    }
}

impl Related<super::book_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookTag.def()
    }
}

impl Related<super::collection_book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CollectionBook.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Review.def()
    }
}

impl Related<super::rating::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rating.def()
    }
}

impl Related<super::reading_status::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReadingStatus.def()
    }
}

impl Related<super::genre::Entity> for Entity {
    fn to() -> RelationDef {
        super::book_genre::Relation::Genre.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::book_genre::Relation::Book.def().rev())
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::book_tag::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::book_tag::Relation::Book.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

define_criteria! {
    /// Filters accepted by `GET /api/books`.
    pub struct BookCriteria for Entity, schema = schema {
        id: RangeFilter<i32>,
        title: StringFilter,
        isbn: StringFilter,
        page_count: RangeFilter<i32>,
        published_date: RangeFilter<NaiveDate>,
        available: BooleanFilter,
        author_id: RangeFilter<i32>,
        genre_id: RangeFilter<i32>,
        tag_id: RangeFilter<i32>,
        collection_id: RangeFilter<i32>,
        review_id: RangeFilter<i32>,
        rating_id: RangeFilter<i32>,
        reading_status_id: RangeFilter<i32>,
    }
}

static SCHEMA: LazyLock<EntitySchema<Entity>> = LazyLock::new(|| {
    EntitySchema::<Entity>::new()
        .column("id", Column::Id)
        .column("title", Column::Title)
        .column("isbn", Column::Isbn)
        .column("page_count", Column::PageCount)
        .column("published_date", Column::PublishedDate)
        .column("available", Column::Available)
        .join(
            "author_id",
            || Relation::Author.def(),
            super::author::Column::Id,
        )
        .join(
            "genre_id",
            || Relation::BookGenre.def(),
            super::book_genre::Column::GenreId,
        )
        .join(
            "tag_id",
            || Relation::BookTag.def(),
            super::book_tag::Column::TagId,
        )
        .join(
            "collection_id",
            || Relation::CollectionBook.def(),
            super::collection_book::Column::CollectionId,
        )
        .join("review_id", || Relation::Review.def(), super::review::Column::Id)
        .join("rating_id", || Relation::Rating.def(), super::rating::Column::Id)
        .join(
            "reading_status_id",
            || Relation::ReadingStatus.def(),
            super::reading_status::Column::Id,
        )
});

#[must_use]
pub fn schema() -> &'static EntitySchema<Entity> {
    &SCHEMA
}

// `DeriveEntityModel` does not derive `PartialEq` on `Column`; unit tests compare columns.
#[cfg(test)]
impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}
