use utoipa::IntoParams;

use crate::criteria::Criteria;
use crate::errors::{QueryError, QueryResult};

/// Paging and sorting parameters of a list request.
///
/// # Pagination
/// `page` is zero-based; `size` defaults to the configured page size and is
/// clamped to the configured maximum.
///
/// # Sorting
/// `sort` takes a property and an optional direction and may be repeated:
/// `sort=publishedDate,desc&sort=title`. Rows are always ordered by primary
/// key last so pages are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Zero-based page index.
    #[param(example = 0)]
    pub page: Option<u64>,
    /// Number of items per page.
    #[param(example = 20)]
    pub size: Option<u64>,
    /// Sort order as `property[,asc|desc]`, repeatable.
    #[param(example = "title,desc")]
    pub sort: Vec<String>,
}

impl PageParams {
    #[must_use]
    pub fn is_page_key(key: &str) -> bool {
        matches!(key, "page" | "size" | "sort")
    }

    /// Bind one paging parameter.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidFilter`] when `page` or `size` is not a
    /// non-negative integer, or the key is not a paging parameter.
    pub fn bind(&mut self, key: &str, raw: &str) -> QueryResult<()> {
        let number = |raw: &str| {
            raw.trim()
                .parse::<u64>()
                .map_err(|e| QueryError::invalid_filter(key, format!("cannot parse `{raw}`: {e}")))
        };
        match key {
            "page" => self.page = Some(number(raw)?),
            "size" => self.size = Some(number(raw)?),
            "sort" => self.sort.push(raw.to_string()),
            _ => return Err(QueryError::invalid_filter(key, "not a paging parameter")),
        }
        Ok(())
    }
}

/// Split decoded query pairs into a criteria object and paging parameters.
///
/// # Errors
///
/// Fails on the first pair that does not bind.
pub fn split_query<C: Criteria>(pairs: &[(String, String)]) -> QueryResult<(C, PageParams)> {
    let mut criteria = C::default();
    let mut params = PageParams::default();
    for (key, value) in pairs {
        if PageParams::is_page_key(key) {
            params.bind(key, value)?;
        } else {
            criteria.bind(key, value)?;
        }
    }
    Ok((criteria, params))
}
