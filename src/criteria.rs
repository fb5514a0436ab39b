//! # Criteria
//!
//! A criteria object is a plain record with one optional filter per filterable
//! attribute of an entity, plus a `distinct` flag. It is pure data: reading a
//! field never creates anything, and the only way to get a filter created on
//! demand is the explicit lazy accessor the declaration macro generates.
//!
//! ```rust,ignore
//! define_criteria! {
//!     pub struct BookCriteria for Entity, schema = schema {
//!         title: StringFilter,
//!         page_count: RangeFilter<i32>,
//!         genre_id: RangeFilter<i32>,
//!     }
//! }
//!
//! let mut criteria = BookCriteria::default();
//! assert!(criteria.title.is_none());
//! criteria.title().contains = Some("Dune".into());
//! ```
//!
//! Criteria are bound from query-string pairs of the form `field.operator=value`,
//! where `field` may be written in camelCase (`pageCount.greaterThan=300`).

use convert_case::{Case, Casing};
use sea_orm::EntityTrait;
use std::fmt::Debug;

use crate::errors::{QueryError, QueryResult};
use crate::filter::{FilterKind, FilterOps};
use crate::schema::EntitySchema;

/// Name and filter family of one criteria field, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: &'static str,
    pub kind: FilterKind,
}

/// Model type of the entity a criteria type filters.
pub type ModelOf<C> = <<C as Criteria>::Entity as EntityTrait>::Model;

/// Implemented by [`define_criteria!`](crate::define_criteria); not meant to be
/// implemented by hand.
pub trait Criteria: Clone + Default + PartialEq + Debug + Send + Sync + 'static {
    type Entity: EntityTrait;

    /// Declared fields, in declaration order.
    const FIELDS: &'static [FieldDecl];

    /// The descriptor mapping each field to an attribute path.
    fn schema() -> &'static EntitySchema<Self::Entity>;

    /// The raw `distinct` flag; `None` means unset.
    fn distinct_flag(&self) -> Option<bool>;

    fn set_distinct(&mut self, distinct: bool);

    /// Filters that are present, in declaration order. Present filters may
    /// still have no operator set.
    fn active_filters(&self) -> Vec<(&'static str, &dyn FilterOps)>;

    /// Bind one operator on the field named `field` (snake_case).
    ///
    /// Returns `None` when the criteria has no such field.
    fn bind_field(&mut self, field: &str, operator: &str, raw: &str)
    -> Option<Result<(), String>>;

    /// Bind one `field.operator=value` query pair, or the bare `distinct` key.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidFilter`] for unknown fields or operators and
    /// for values that do not parse.
    fn bind(&mut self, key: &str, raw: &str) -> QueryResult<()> {
        if key == "distinct" {
            let distinct = raw.trim().parse::<bool>().map_err(|e| {
                QueryError::invalid_filter("distinct", format!("cannot parse `{raw}`: {e}"))
            })?;
            self.set_distinct(distinct);
            return Ok(());
        }

        let Some((field, operator)) = key.split_once('.') else {
            return Err(QueryError::invalid_filter(
                key,
                "expected a `field.operator` parameter",
            ));
        };
        let name = field.to_case(Case::Snake);
        match self.bind_field(&name, operator, raw) {
            Some(bound) => bound.map_err(|reason| QueryError::invalid_filter(field, reason)),
            None => Err(QueryError::invalid_filter(field, "unknown filter field")),
        }
    }

    /// Build a criteria object from query pairs.
    ///
    /// # Errors
    ///
    /// Fails on the first pair that does not bind; see [`Criteria::bind`].
    fn from_pairs<'a, I>(pairs: I) -> QueryResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut criteria = Self::default();
        for (key, value) in pairs {
            criteria.bind(key, value)?;
        }
        Ok(criteria)
    }
}

/// Declare a criteria struct for an entity.
///
/// Generates the struct with one `pub Option<Filter>` field per declared
/// attribute plus `pub distinct: Option<bool>`, a lazy accessor per field that
/// creates an empty filter on first use, `distinct()` (unset reads as `true`
/// and is recorded), `copy()`, and the [`Criteria`] impl.
#[macro_export]
macro_rules! define_criteria {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident for $entity:ty, schema = $schema:path {
            $( $(#[$field_meta:meta])* $field:ident : $filter:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field: ::core::option::Option<$filter>,
            )*
            /// Deduplicate result rows; unset means `true`.
            pub distinct: ::core::option::Option<bool>,
        }

        impl $name {
            $(
                /// Filter on this field, created empty if it was unset.
                pub fn $field(&mut self) -> &mut $filter {
                    self.$field
                        .get_or_insert_with(<$filter as ::core::default::Default>::default)
                }
            )*

            /// Current distinct flag; an unset flag is recorded as `true`.
            pub fn distinct(&mut self) -> bool {
                *self.distinct.get_or_insert(true)
            }

            /// Value-wise copy sharing no state with `self`.
            #[must_use]
            pub fn copy(&self) -> Self {
                ::core::clone::Clone::clone(self)
            }
        }

        impl $crate::criteria::Criteria for $name {
            type Entity = $entity;

            const FIELDS: &'static [$crate::criteria::FieldDecl] = &[
                $(
                    $crate::criteria::FieldDecl {
                        name: ::core::stringify!($field),
                        kind: <$filter as $crate::filter::Filter>::KIND,
                    },
                )*
            ];

            fn schema() -> &'static $crate::schema::EntitySchema<$entity> {
                $schema()
            }

            fn distinct_flag(&self) -> ::core::option::Option<bool> {
                self.distinct
            }

            fn set_distinct(&mut self, distinct: bool) {
                self.distinct = ::core::option::Option::Some(distinct);
            }

            fn active_filters(&self) -> ::std::vec::Vec<(&'static str, &dyn $crate::filter::FilterOps)> {
                let mut active: ::std::vec::Vec<(&'static str, &dyn $crate::filter::FilterOps)> =
                    ::std::vec::Vec::new();
                $(
                    if let ::core::option::Option::Some(filter) = &self.$field {
                        active.push((::core::stringify!($field), filter));
                    }
                )*
                active
            }

            fn bind_field(
                &mut self,
                field: &str,
                operator: &str,
                raw: &str,
            ) -> ::core::option::Option<::core::result::Result<(), ::std::string::String>> {
                match field {
                    $(
                        ::core::stringify!($field) => ::core::option::Option::Some(
                            $crate::filter::Filter::bind(self.$field(), operator, raw),
                        ),
                    )*
                    _ => ::core::option::Option::None,
                }
            }
        }
    };
}
