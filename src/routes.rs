use axum::{
    Json, Router,
    extract::{Path, Query, RawQuery, State},
    http::HeaderMap,
    routing::get,
};
use sea_orm::{ConnectionTrait, DatabaseConnection};
use serde::Serialize;
use std::sync::Arc;

use crate::config::QueryConfig;
use crate::criteria::{Criteria, ModelOf};
use crate::entities::{
    author::AuthorCriteria, book::BookCriteria, book_genre::BookGenreCriteria,
    book_tag::BookTagCriteria, collection::CollectionCriteria,
    collection_book::CollectionBookCriteria, genre::GenreCriteria, rating::RatingCriteria,
    reading_status::ReadingStatusCriteria, review::ReviewCriteria, tag::TagCriteria,
};
use crate::errors::{ApiError, QueryResult};
use crate::models::{PageParams, split_query};
use crate::openapi::ApiDoc;
use crate::pagination::{PageRequest, pagination_headers};
use crate::repository::{PrimaryKeyValue, Repository, SeaOrmRepository};
use crate::service::QueryService;

/// Shared state of one resource's routes.
pub struct ResourceState<C: Criteria> {
    service: QueryService<C, SeaOrmRepository<C::Entity>>,
    config: QueryConfig,
    resource: &'static str,
}

type SharedState<C> = State<Arc<ResourceState<C>>>;

/// Query string with the paging keys removed, ready for `page=`/`size=` to be appended.
fn link_base(resource: &str, raw_query: Option<&str>) -> String {
    let kept: Vec<&str> = raw_query
        .unwrap_or_default()
        .split('&')
        .filter(|part| {
            let key = part.split('=').next().unwrap_or_default();
            !part.is_empty() && key != "page" && key != "size"
        })
        .collect();
    if kept.is_empty() {
        format!("/api/{resource}?")
    } else {
        format!("/api/{resource}?{}&", kept.join("&"))
    }
}

/// `GET /api/{resource}`: one page of entities matching the criteria.
pub async fn list<C>(
    State(state): SharedState<C>,
    RawQuery(raw_query): RawQuery,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<(HeaderMap, Json<Vec<ModelOf<C>>>), ApiError>
where
    C: Criteria,
    SeaOrmRepository<C::Entity>: Repository<C::Entity>,
    ModelOf<C>: Serialize,
{
    let (criteria, params): (C, PageParams) = split_query(&pairs)?;
    let page_request = PageRequest::resolve(&params, C::schema(), &state.config)?;
    let page = state
        .service
        .find_page(Some(&criteria), &page_request)
        .await?;

    let headers = pagination_headers(&page, &link_base(state.resource, raw_query.as_deref()));
    Ok((headers, Json(page.content)))
}

/// `GET /api/{resource}/count`: number of entities matching the criteria.
pub async fn count<C>(
    State(state): SharedState<C>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<u64>, ApiError>
where
    C: Criteria,
    SeaOrmRepository<C::Entity>: Repository<C::Entity>,
{
    let (criteria, _): (C, PageParams) = split_query(&pairs)?;
    let total = state.service.count(Some(&criteria)).await?;
    Ok(Json(total))
}

/// `GET /api/{resource}/{id}`
pub async fn get_one<C>(
    State(state): SharedState<C>,
    Path(id): Path<i32>,
) -> Result<Json<ModelOf<C>>, ApiError>
where
    C: Criteria,
    SeaOrmRepository<C::Entity>: Repository<C::Entity>,
    ModelOf<C>: Serialize,
    PrimaryKeyValue<C::Entity>: From<i32>,
{
    state
        .service
        .find_by_id(id.into())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(state.resource, Some(id.to_string())))
}

/// Routes for one resource: list, count and get-by-id under `/{resource}`.
///
/// # Errors
///
/// [`QueryError::Configuration`](crate::errors::QueryError::Configuration)
/// when the criteria's schema is incomplete.
pub fn resource_router<C>(
    resource: &'static str,
    db: DatabaseConnection,
    config: &QueryConfig,
) -> QueryResult<Router>
where
    C: Criteria,
    SeaOrmRepository<C::Entity>: Repository<C::Entity>,
    ModelOf<C>: Serialize,
    PrimaryKeyValue<C::Entity>: From<i32>,
{
    let options = config.build_options(db.get_database_backend());
    let service = QueryService::new(SeaOrmRepository::new(db), options)?;
    let state = Arc::new(ResourceState {
        service,
        config: config.clone(),
        resource,
    });

    Ok(Router::new()
        .route(&format!("/{resource}"), get(list::<C>))
        .route(&format!("/{resource}/count"), get(count::<C>))
        .route(&format!("/{resource}/{{id}}"), get(get_one::<C>))
        .with_state(state))
}

/// Accumulates resource routers and their OpenAPI paths.
struct Catalog<'a> {
    db: &'a DatabaseConnection,
    config: &'a QueryConfig,
    api: Router,
    docs: ApiDoc,
}

impl Catalog<'_> {
    fn resource<C>(self, resource: &'static str) -> QueryResult<Self>
    where
        C: Criteria,
        SeaOrmRepository<C::Entity>: Repository<C::Entity>,
        ModelOf<C>: Serialize,
        PrimaryKeyValue<C::Entity>: From<i32>,
    {
        let Self {
            db,
            config,
            api,
            docs,
        } = self;
        Ok(Self {
            db,
            config,
            api: api.merge(resource_router::<C>(resource, db.clone(), config)?),
            docs: docs.resource::<C>(resource),
        })
    }
}

/// Every catalog resource under `/api`, plus the OpenAPI document at
/// `/api/openapi.json`. All schemas are validated here, so a misconfigured
/// descriptor fails at startup.
///
/// # Errors
///
/// The first schema validation failure.
pub fn catalog_router(db: &DatabaseConnection, config: &QueryConfig) -> QueryResult<Router> {
    let catalog = Catalog {
        db,
        config,
        api: Router::new(),
        docs: ApiDoc::new(),
    }
    .resource::<BookCriteria>("books")?
    .resource::<AuthorCriteria>("authors")?
    .resource::<GenreCriteria>("genres")?
    .resource::<TagCriteria>("tags")?
    .resource::<CollectionCriteria>("collections")?
    .resource::<ReviewCriteria>("reviews")?
    .resource::<RatingCriteria>("ratings")?
    .resource::<ReadingStatusCriteria>("reading-statuses")?
    .resource::<BookGenreCriteria>("book-genres")?
    .resource::<BookTagCriteria>("book-tags")?
    .resource::<CollectionBookCriteria>("collection-books")?;

    let doc = catalog.docs.build();
    let api = catalog.api.route(
        "/openapi.json",
        get(move || {
            let doc = doc.clone();
            async move { Json(doc) }
        }),
    );
    Ok(Router::new().nest("/api", api))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_base_drops_paging_keys() {
        assert_eq!(link_base("books", None), "/api/books?");
        assert_eq!(link_base("books", Some("page=2&size=5")), "/api/books?");
        assert_eq!(
            link_base("books", Some("title.contains=Dune&page=1&sort=title,desc")),
            "/api/books?title.contains=Dune&sort=title,desc&"
        );
    }
}
