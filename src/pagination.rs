use axum::http::header::{HeaderMap, HeaderValue};
use sea_orm::{ColumnTrait, EntityTrait, sea_query::Order};
use serde::Serialize;

use crate::config::QueryConfig;
use crate::errors::{QueryError, QueryResult};
use crate::models::PageParams;
use crate::schema::EntitySchema;
use crate::sort::resolve_sort;

/// A zero-based page request with resolved sort columns.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest<C> {
    pub page: u64,
    pub size: u64,
    pub sort: Vec<(C, Order)>,
}

impl<C> PageRequest<C> {
    #[must_use]
    pub fn new(page: u64, size: u64) -> Self {
        Self {
            page,
            size,
            sort: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_sort(mut self, column: C, order: Order) -> Self {
        self.sort.push((column, order));
        self
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }
}

impl<C: ColumnTrait> PageRequest<C> {
    /// Resolve raw query parameters against an entity schema.
    ///
    /// A missing size uses `default_page_size`, a size above `max_page_size` is
    /// clamped to it.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidFilter`] for a zero size, a page whose row
    /// offset does not fit a signed 64-bit SQL offset, or an unknown sort property.
    pub fn resolve<E>(
        params: &PageParams,
        schema: &EntitySchema<E>,
        config: &QueryConfig,
    ) -> QueryResult<Self>
    where
        E: EntityTrait<Column = C>,
    {
        let size = params.size.unwrap_or(config.default_page_size);
        if size == 0 {
            return Err(QueryError::invalid_filter("size", "must be at least 1"));
        }
        let size = size.min(config.max_page_size);
        let page = params.page.unwrap_or(0);
        let offset = page.checked_mul(size).and_then(|o| i64::try_from(o).ok());
        if offset.is_none() {
            return Err(QueryError::invalid_filter("page", "page is out of range"));
        }
        Ok(Self {
            page,
            size,
            sort: resolve_sort(&params.sort, schema)?,
        })
    }
}

/// One page of results plus the totals needed to navigate the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(content: Vec<T>, page: u64, size: u64, total_elements: u64) -> Self {
        let total_pages = if size == 0 {
            0
        } else {
            total_elements.div_ceil(size)
        };
        Self {
            content,
            page,
            size,
            total_elements,
            total_pages,
        }
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page.saturating_add(1) < self.total_pages
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

/// Remove characters that may not appear in a header value.
fn sanitize_header_text(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .collect()
}

/// Build the `X-Total-Count` and `Link` headers for a page.
///
/// `base` is the request path including any query string the links must keep,
/// ending in `?` or `&` (for example `/api/books?title.contains=Dune&`).
#[must_use]
pub fn pagination_headers<T>(page: &Page<T>, base: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("X-Total-Count", HeaderValue::from(page.total_elements));

    let base = sanitize_header_text(base);
    let link = |number: u64, rel: &str| {
        format!("<{base}page={number}&size={}>; rel=\"{rel}\"", page.size)
    };

    let mut links = Vec::with_capacity(4);
    if page.has_next() {
        links.push(link(page.page.saturating_add(1), "next"));
    }
    if page.has_previous() {
        links.push(link(page.page - 1, "prev"));
    }
    links.push(link(page.total_pages.saturating_sub(1), "last"));
    links.push(link(0, "first"));

    // sanitized above, a failure here means an unexpected byte slipped through
    if let Ok(value) = HeaderValue::from_str(&links.join(",")) {
        headers.insert("Link", value);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(number: u64, size: u64, total: u64) -> Page<u8> {
        Page::new(Vec::new(), number, size, total)
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(page(0, 20, 0).total_pages, 0);
        assert_eq!(page(0, 20, 20).total_pages, 1);
        assert_eq!(page(0, 20, 21).total_pages, 2);
    }

    #[test]
    fn test_total_count_header() {
        let headers = pagination_headers(&page(0, 10, 100), "/api/books?");
        assert_eq!(headers.get("X-Total-Count").unwrap(), "100");
    }

    #[test]
    fn test_link_header_middle_page() {
        let headers = pagination_headers(&page(2, 10, 45), "/api/books?title.contains=Dune&");
        let link = headers.get("Link").unwrap().to_str().unwrap();
        assert_eq!(
            link,
            "</api/books?title.contains=Dune&page=3&size=10>; rel=\"next\",\
             </api/books?title.contains=Dune&page=1&size=10>; rel=\"prev\",\
             </api/books?title.contains=Dune&page=4&size=10>; rel=\"last\",\
             </api/books?title.contains=Dune&page=0&size=10>; rel=\"first\""
        );
    }

    #[test]
    fn test_link_header_empty_result() {
        let headers = pagination_headers(&page(0, 20, 0), "/api/books?");
        let link = headers.get("Link").unwrap().to_str().unwrap();
        assert!(!link.contains("next"));
        assert!(!link.contains("prev"));
        assert!(link.contains("page=0&size=20>; rel=\"last\""));
    }

    #[test]
    fn test_link_header_strips_control_characters() {
        let headers = pagination_headers(&page(0, 10, 5), "/api/books\r\nInjected: evil?");
        let link = headers.get("Link").unwrap().to_str().unwrap();
        assert!(!link.contains('\r'));
        assert!(!link.contains('\n'));
    }

    #[test]
    fn test_offset_and_map() {
        let request = PageRequest::<crate::entities::book::Column>::new(3, 25);
        assert_eq!(request.offset(), 75);

        let mapped = Page::new(vec![1, 2], 0, 2, 2).map(|n: i32| n * 10);
        assert_eq!(mapped.content, vec![10, 20]);
        assert_eq!(mapped.total_pages, 1);
    }

    #[test]
    fn test_resolve_rejects_offset_overflow() {
        let schema = crate::entities::book::schema();
        let config = QueryConfig::default();
        let params = |page| PageParams {
            page: Some(page),
            size: Some(20),
            sort: Vec::new(),
        };

        let err = PageRequest::resolve(&params(u64::MAX), schema, &config).unwrap_err();
        assert!(matches!(err, QueryError::InvalidFilter { ref field, .. } if field == "page"));

        let err = PageRequest::resolve(&params(u64::MAX / 20), schema, &config).unwrap_err();
        assert!(matches!(err, QueryError::InvalidFilter { ref field, .. } if field == "page"));

        let last = u64::try_from(i64::MAX).unwrap() / 20;
        let request = PageRequest::resolve(&params(last), schema, &config).unwrap();
        assert_eq!(request.offset(), last * 20);
    }

    #[test]
    fn test_has_next_on_last_possible_page() {
        let last = Page::<u8>::new(Vec::new(), u64::MAX, 1, u64::MAX);
        assert!(!last.has_next());
        assert!(last.has_previous());
    }
}
