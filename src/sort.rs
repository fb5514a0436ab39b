use convert_case::{Case, Casing};
use sea_orm::{EntityTrait, sea_query::Order};

use crate::errors::{QueryError, QueryResult};
use crate::schema::EntitySchema;

const DEFAULT_SORT_ORDER: &str = "asc";

/// Convert a sort direction to `Order`; anything but asc/desc is rejected.
fn parse_order(sort_order: &str) -> Option<Order> {
    match sort_order.trim().to_lowercase().as_str() {
        "asc" => Some(Order::Asc),
        "desc" => Some(Order::Desc),
        _ => None,
    }
}

/// Resolve Spring style sort parameters (`sort=title,desc`, `sort=pageCount`)
/// against the columns an entity schema exposes.
///
/// # Errors
///
/// Returns [`QueryError::InvalidFilter`] for an unknown property, a joined
/// field, or a direction other than `asc`/`desc`.
pub fn resolve_sort<E: EntityTrait>(
    sort: &[String],
    schema: &EntitySchema<E>,
) -> QueryResult<Vec<(E::Column, Order)>> {
    sort.iter()
        .filter(|entry| !entry.trim().is_empty())
        .map(|entry| {
            let (property, direction) = entry
                .split_once(',')
                .unwrap_or((entry.as_str(), DEFAULT_SORT_ORDER));
            let name = property.trim().to_case(Case::Snake);
            let column = schema.sort_column(&name).ok_or_else(|| {
                QueryError::invalid_filter("sort", format!("cannot sort by `{property}`"))
            })?;
            let order = parse_order(direction).ok_or_else(|| {
                QueryError::invalid_filter("sort", format!("unknown direction `{direction}`"))
            })?;
            Ok((column, order))
        })
        .collect()
}
