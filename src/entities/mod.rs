//! Catalog entities, each with its criteria type and schema descriptor.
//!
//! Association filters (`genre_id` on books, `book_id` on genres, ...) are
//! mapped to LEFT joins through the owning relation.

pub mod author;
pub mod book;
pub mod book_genre;
pub mod book_tag;
pub mod collection;
pub mod collection_book;
pub mod genre;
pub mod rating;
pub mod reading_status;
pub mod review;
pub mod tag;
