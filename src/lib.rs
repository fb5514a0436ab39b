//! Criteria-to-query compiler for a social-reading catalog.
//!
//! A request like `GET /api/books?title.contains=Dune&pageCount.greaterThan=300`
//! is bound into a [`BookCriteria`](entities::book::BookCriteria), compiled
//! against the book [`EntitySchema`] into a [`Specification`], and run through
//! a [`Repository`] as one paged select plus one count.

pub mod config;
pub mod criteria;
pub mod entities;
pub mod errors;
pub mod filter;
pub mod models;
pub mod openapi;
pub mod pagination;
pub mod repository;
pub mod routes;
pub mod schema;
pub mod service;
pub mod sort;
pub mod specification;

pub use config::{AppConfig, QueryConfig};
pub use criteria::Criteria;
pub use errors::{ApiError, QueryError, QueryResult};
pub use filter::{BooleanFilter, Filter, FilterOps, RangeFilter, StringFilter};
pub use pagination::{Page, PageRequest};
pub use repository::{Repository, SeaOrmRepository};
pub use routes::catalog_router;
pub use schema::EntitySchema;
pub use service::QueryService;
pub use specification::{BuildOptions, Specification, StringMatching, build_specification};
