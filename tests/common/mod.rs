use axum::Router;
use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, DbErr, Schema, Set};
use sea_orm_migration::prelude::*;
use shelfcrate::QueryConfig;
use shelfcrate::entities::{
    author, book, book_genre, book_tag, collection, collection_book, genre, rating,
    reading_status, review, tag,
};

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Empty schema plus the catalog fixture below.
pub async fn setup_catalog_db() -> Result<DatabaseConnection, DbErr> {
    let db = setup_test_db().await?;
    seed_catalog(&db).await?;
    Ok(db)
}

pub fn setup_test_app(db: &DatabaseConnection) -> Router {
    shelfcrate::catalog_router(db, &QueryConfig::default()).expect("catalog schemas are valid")
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateCatalogTables)]
    }
}

pub struct CreateCatalogTables;

impl MigrationName for CreateCatalogTables {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_catalog_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateCatalogTables {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        manager
            .create_table(schema.create_table_from_entity(author::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(book::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(genre::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(tag::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(collection::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(book_genre::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(book_tag::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(collection_book::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(review::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(rating::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(reading_status::Entity))
            .await?;
        Ok(())
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

fn book_row(
    id: i32,
    title: &str,
    isbn: Option<&str>,
    page_count: Option<i32>,
    published_date: Option<NaiveDate>,
    available: bool,
    author_id: Option<i32>,
) -> book::ActiveModel {
    book::ActiveModel {
        id: Set(id),
        title: Set(title.to_string()),
        isbn: Set(isbn.map(str::to_string)),
        page_count: Set(page_count),
        published_date: Set(published_date),
        available: Set(available),
        author_id: Set(author_id),
    }
}

/// Catalog fixture.
///
/// | id | title                     | pages | author | genres | isbn |
/// |----|---------------------------|-------|--------|--------|------|
/// | 1  | Dune                      | 412   | 1      | 5, 9   | yes  |
/// | 2  | Dune Messiah              | 256   | 1      | 5      | no   |
/// | 3  | Children of Dune          | 444   | 1      | 5      | yes  |
/// | 4  | The Left Hand of Darkness | 304   | 2      | 5, 9   | yes  |
/// | 5  | A Wizard of Earthsea      | 183   | 2      | 7      | no   |
/// | 6  | Guards! Guards!           | 416   | 3      | 7      | no   |
/// | 7  | 100% Pure_Fiction         | -     | -      | -      | no   |
///
/// Genres: 5 Science Fiction, 7 Fantasy, 9 Classic.
pub async fn seed_catalog(db: &DatabaseConnection) -> Result<(), DbErr> {
    for (id, name, nationality, birth_year) in [
        (1, "Frank Herbert", Some("American"), Some(1920)),
        (2, "Ursula K. Le Guin", Some("American"), Some(1929)),
        (3, "Terry Pratchett", None, Some(1948)),
    ] {
        author::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            nationality: Set(nationality.map(str::to_string)),
            birth_year: Set(birth_year),
        }
        .insert(db)
        .await?;
    }

    for (id, name) in [(5, "Science Fiction"), (7, "Fantasy"), (9, "Classic")] {
        genre::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            description: Set(None),
        }
        .insert(db)
        .await?;
    }

    for (id, name) in [(1, "desert"), (2, "politics")] {
        tag::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
        }
        .insert(db)
        .await?;
    }

    let books = [
        book_row(1, "Dune", Some("9780441013593"), Some(412), Some(date(1965, 8, 1)), true, Some(1)),
        book_row(2, "Dune Messiah", None, Some(256), Some(date(1969, 10, 15)), true, Some(1)),
        book_row(3, "Children of Dune", Some("9780441104024"), Some(444), Some(date(1976, 4, 1)), false, Some(1)),
        book_row(4, "The Left Hand of Darkness", Some("9780441478125"), Some(304), Some(date(1969, 3, 1)), true, Some(2)),
        book_row(5, "A Wizard of Earthsea", None, Some(183), Some(date(1968, 11, 1)), true, Some(2)),
        book_row(6, "Guards! Guards!", None, Some(416), Some(date(1989, 11, 1)), false, Some(3)),
        book_row(7, "100% Pure_Fiction", None, None, None, true, None),
    ];
    for book in books {
        book.insert(db).await?;
    }

    let book_genres = [(1, 5), (1, 9), (2, 5), (3, 5), (4, 5), (4, 9), (5, 7), (6, 7)];
    for (book_id, genre_id) in book_genres {
        book_genre::ActiveModel {
            book_id: Set(book_id),
            genre_id: Set(genre_id),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    for (book_id, tag_id) in [(1, 1), (1, 2), (2, 2), (4, 2)] {
        book_tag::ActiveModel {
            book_id: Set(book_id),
            tag_id: Set(tag_id),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    collection::ActiveModel {
        id: Set(1),
        name: Set("Desert Classics".to_string()),
        description: Set(Some("Sand, spice and politics".to_string())),
        is_public: Set(true),
        owner_login: Set("alice".to_string()),
    }
    .insert(db)
    .await?;
    for book_id in [1, 2] {
        collection_book::ActiveModel {
            collection_id: Set(1),
            book_id: Set(book_id),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    for (book_id, user_login, score) in [(1, "alice", 5), (1, "bob", 4), (4, "alice", 3)] {
        rating::ActiveModel {
            book_id: Set(book_id),
            user_login: Set(user_login.to_string()),
            score: Set(score),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    review::ActiveModel {
        book_id: Set(1),
        user_login: Set("alice".to_string()),
        title: Set(Some("Still the best".to_string())),
        body: Set("The spice must flow.".to_string()),
        spoiler: Set(false),
        created_date: Set(date(2024, 1, 10)),
        ..Default::default()
    }
    .insert(db)
    .await?;

    for (book_id, status, progress) in [(1, "READ", Some(100)), (3, "READING", Some(40)), (5, "WANT_TO_READ", None)] {
        reading_status::ActiveModel {
            book_id: Set(book_id),
            user_login: Set("alice".to_string()),
            status: Set(status.to_string()),
            progress: Set(progress),
            started_date: Set(progress.map(|_| date(2024, 2, 1))),
            finished_date: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    Ok(())
}
