//! # Specification Builder
//!
//! Compiles a criteria object into a [`Specification`]: a sea-orm
//! [`Condition`] plus the joins and the distinct flag needed to evaluate it.
//!
//! Rules:
//!
//! - no criteria, or a criteria with nothing set, is the always-true predicate
//! - filters are visited in declaration order, operators in
//!   [`FilterOps::operations`](crate::filter::FilterOps::operations) order,
//!   and everything is ANDed
//! - a filter with no operator set, or whose operators all match everything,
//!   contributes no clause and no join
//! - association fields add a LEFT join aliased `{field}_join`; with `distinct`
//!   (the default) the extra rows a join fans out are collapsed again
//! - `in` with an empty list matches nothing, `notIn` with an empty list matches everything
//! - `specified=true` is `IS NOT NULL`, `specified=false` is `IS NULL`
//! - `notEquals`/`notIn` follow SQL semantics, so null attributes are not matched

use sea_orm::sea_query::{Alias, ColumnRef, Expr, IntoColumnRef, LikeExpr, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, DatabaseBackend, EntityTrait, QueryFilter, QuerySelect, RelationDef,
    Select,
};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

use crate::criteria::Criteria;
use crate::errors::{QueryError, QueryResult};
use crate::filter::Operation;
use crate::schema::{AttributeKind, EntitySchema, FieldTarget, JoinKind};

/// How `contains`, `doesNotContain`, `startsWith` and `endsWith` compare text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringMatching {
    /// `UPPER(column) LIKE UPPER(pattern)`, folded by the database
    #[default]
    CaseInsensitive,
    /// Byte-exact matching: `LIKE` on Postgres, `LIKE BINARY` on MySQL, `GLOB` on SQLite.
    CaseSensitive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    pub string_matching: StringMatching,
    pub backend: DatabaseBackend,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            string_matching: StringMatching::default(),
            backend: DatabaseBackend::Sqlite,
        }
    }
}

/// A join the specification needs, under its alias.
#[derive(Debug, Clone)]
pub struct Join {
    pub alias: String,
    pub kind: JoinKind,
    relation: fn() -> RelationDef,
}

impl Join {
    #[must_use]
    pub fn relation(&self) -> RelationDef {
        (self.relation)()
    }
}

/// A compiled predicate over `E`, ready to be applied to a select.
#[derive(Debug, Clone)]
pub struct Specification<E> {
    condition: Condition,
    joins: Vec<Join>,
    distinct: bool,
    _entity: PhantomData<fn() -> E>,
}

impl<E: EntityTrait> Default for Specification<E> {
    fn default() -> Self {
        Self::all()
    }
}

impl<E: EntityTrait> Specification<E> {
    /// The always-true predicate: no clause, no join, no deduplication.
    #[must_use]
    pub fn all() -> Self {
        Self {
            condition: Condition::all(),
            joins: Vec::new(),
            distinct: false,
            _entity: PhantomData,
        }
    }

    #[must_use]
    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    #[must_use]
    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    #[must_use]
    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.condition.is_empty() && self.joins.is_empty()
    }

    /// Add the joins, the condition and `DISTINCT` to `select`.
    #[must_use]
    pub fn apply(&self, mut select: Select<E>) -> Select<E> {
        for join in &self.joins {
            select = select.join_as(
                join.kind.join_type(),
                join.relation(),
                Alias::new(join.alias.as_str()),
            );
        }
        select = select.filter(self.condition.clone());
        if self.distinct {
            select = select.distinct();
        }
        select
    }

    #[must_use]
    pub fn select(&self) -> Select<E> {
        self.apply(E::find())
    }
}

/// Compile `criteria` against `schema`.
///
/// `None` and an empty criteria both produce [`Specification::all`] (an empty
/// criteria still carries its distinct flag).
///
/// # Errors
///
/// - [`QueryError::Configuration`] when a set filter has no mapping in the schema,
///   or its mapping cannot serve the filter family
/// - [`QueryError::InvalidFilter`] when an ordering operator targets an unordered
///   attribute, or a substring operator targets non-text
pub fn build_specification<C: Criteria>(
    criteria: Option<&C>,
    schema: &EntitySchema<C::Entity>,
    options: &BuildOptions,
) -> QueryResult<Specification<C::Entity>> {
    let mut spec = Specification::all();
    let Some(criteria) = criteria else {
        return Ok(spec);
    };
    spec.distinct = criteria.distinct_flag().unwrap_or(true);

    for (name, filter) in criteria.active_filters() {
        let operations = filter.operations();
        if operations.is_empty() {
            continue;
        }

        let mapping = schema.field(name).ok_or_else(|| {
            QueryError::configuration(format!(
                "field `{name}` is not mapped in the {} schema",
                schema.table_name()
            ))
        })?;
        let kind = mapping.attribute_kind();
        if !kind.accepts(filter.kind()) {
            return Err(QueryError::configuration(format!(
                "field `{name}` uses a {} filter but is mapped to a {kind} attribute in the {} schema",
                filter.kind(),
                schema.table_name()
            )));
        }

        let alias = format!("{name}_join");
        let column = match &mapping.target {
            FieldTarget::Column(column) => column.as_column_ref().into_column_ref(),
            FieldTarget::Join(join) => {
                (Alias::new(alias.as_str()), Alias::new(join.target_column.as_str()))
                    .into_column_ref()
            }
        };

        let mut exprs = Vec::with_capacity(operations.len());
        for operation in &operations {
            if let Some(expr) = translate(name, &column, kind, operation, options)? {
                exprs.push(expr);
            }
        }
        if exprs.is_empty() {
            continue;
        }

        if let FieldTarget::Join(join) = &mapping.target {
            spec.joins.push(Join {
                alias,
                kind: join.kind,
                relation: join.relation,
            });
        }
        for expr in exprs {
            spec.condition = spec.condition.add(expr);
        }
    }

    Ok(spec)
}

fn translate(
    field: &str,
    column: &ColumnRef,
    kind: AttributeKind,
    operation: &Operation,
    options: &BuildOptions,
) -> QueryResult<Option<SimpleExpr>> {
    if operation.is_ordering() && !kind.is_ordered() {
        return Err(QueryError::invalid_filter(
            field,
            format!("`{}` needs an ordered attribute, not {kind}", operation.name()),
        ));
    }
    if operation.is_substring() && kind != AttributeKind::Text {
        return Err(QueryError::invalid_filter(
            field,
            format!("`{}` needs a text attribute, not {kind}", operation.name()),
        ));
    }

    let col = || Expr::col(column.clone());
    let expr = match operation {
        Operation::Equals(value) => col().eq(value.clone()),
        Operation::NotEquals(value) => col().ne(value.clone()),
        Operation::In(values) if values.is_empty() => Expr::cust("1 = 0"),
        Operation::In(values) => col().is_in(values.iter().cloned()),
        Operation::NotIn(values) if values.is_empty() => return Ok(None),
        Operation::NotIn(values) => col().is_not_in(values.iter().cloned()),
        Operation::GreaterThan(value) => col().gt(value.clone()),
        Operation::GreaterThanOrEqual(value) => col().gte(value.clone()),
        Operation::LessThan(value) => col().lt(value.clone()),
        Operation::LessThanOrEqual(value) => col().lte(value.clone()),
        Operation::Contains(needle) => text_match(column, Anchor::Anywhere, needle, options, false),
        Operation::DoesNotContain(needle) => {
            text_match(column, Anchor::Anywhere, needle, options, true)
        }
        Operation::StartsWith(needle) => text_match(column, Anchor::Start, needle, options, false),
        Operation::EndsWith(needle) => text_match(column, Anchor::End, needle, options, false),
        Operation::Specified(true) => col().is_not_null(),
        Operation::Specified(false) => col().is_null(),
    };
    Ok(Some(expr))
}

#[derive(Debug, Clone, Copy)]
enum Anchor {
    Anywhere,
    Start,
    End,
}

fn text_match(
    column: &ColumnRef,
    anchor: Anchor,
    needle: &str,
    options: &BuildOptions,
    negate: bool,
) -> SimpleExpr {
    let col = || Expr::col(column.clone());
    let like = |pattern: String| LikeExpr::new(pattern).escape('\\');

    match (options.string_matching, options.backend) {
        (StringMatching::CaseInsensitive, backend) => {
            let operator = if negate { "NOT LIKE" } else { "LIKE" };
            let escape = if backend == DatabaseBackend::MySql { r"'\\'" } else { r"'\'" };
            Expr::cust_with_exprs(
                format!("UPPER($1) {operator} UPPER($2) ESCAPE {escape}"),
                [col().into(), Expr::val(like_pattern(needle, anchor)).into()],
            )
        }
        (StringMatching::CaseSensitive, DatabaseBackend::Sqlite) => {
            let glob = Expr::cust_with_exprs(
                "$1 GLOB $2",
                [col().into(), Expr::val(glob_pattern(needle, anchor)).into()],
            );
            if negate { glob.not() } else { glob }
        }
        (StringMatching::CaseSensitive, DatabaseBackend::MySql) => {
            let binary = Expr::cust_with_exprs(
                "$1 LIKE BINARY $2",
                [col().into(), Expr::val(like_pattern(needle, anchor)).into()],
            );
            if negate { binary.not() } else { binary }
        }
        (StringMatching::CaseSensitive, _) => {
            let pattern = like(like_pattern(needle, anchor));
            if negate {
                col().not_like(pattern)
            } else {
                col().like(pattern)
            }
        }
    }
}

/// LIKE pattern with `\`, `%` and `_` in `needle` escaped by `\`.
fn like_pattern(needle: &str, anchor: Anchor) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    match anchor {
        Anchor::Anywhere => format!("%{escaped}%"),
        Anchor::Start => format!("{escaped}%"),
        Anchor::End => format!("%{escaped}"),
    }
}

/// GLOB has no escape character; metacharacters are wrapped in a one-char class.
fn glob_pattern(needle: &str, anchor: Anchor) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    for ch in needle.chars() {
        match ch {
            '*' | '?' | '[' => {
                escaped.push('[');
                escaped.push(ch);
                escaped.push(']');
            }
            _ => escaped.push(ch),
        }
    }
    match anchor {
        Anchor::Anywhere => format!("*{escaped}*"),
        Anchor::Start => format!("{escaped}*"),
        Anchor::End => format!("*{escaped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{author, book, rating};
    use crate::filter::{RangeFilter, StringFilter};
    use sea_orm::QueryTrait;

    fn sql(spec: &Specification<book::Entity>) -> String {
        spec.select().build(DatabaseBackend::Sqlite).to_string()
    }

    fn build(criteria: &book::BookCriteria) -> QueryResult<Specification<book::Entity>> {
        build_specification(Some(criteria), book::schema(), &BuildOptions::default())
    }

    #[test]
    fn test_absent_criteria_is_unrestricted() {
        let spec =
            build_specification::<book::BookCriteria>(None, book::schema(), &BuildOptions::default())
                .unwrap();
        assert!(spec.is_unrestricted());
        assert!(!spec.is_distinct());
        assert!(!sql(&spec).contains("WHERE"));
    }

    #[test]
    fn test_empty_criteria_is_unrestricted_but_distinct() {
        let spec = build(&book::BookCriteria::default()).unwrap();
        assert!(spec.is_unrestricted());
        assert!(spec.is_distinct());
    }

    #[test]
    fn test_present_but_empty_filter_adds_nothing() {
        let mut criteria = book::BookCriteria::default();
        criteria.genre_id();
        criteria.title();

        let spec = build(&criteria).unwrap();
        assert!(spec.is_unrestricted());
        assert!(spec.joins().is_empty());
    }

    #[test]
    fn test_operators_are_anded() {
        let mut criteria = book::BookCriteria::default();
        criteria.page_count().greater_than = Some(300);
        criteria.page_count().less_than_or_equal = Some(900);
        criteria.available().equals = Some(true);

        let spec = build(&criteria).unwrap();
        let sql = sql(&spec);
        assert!(sql.contains(r#""book"."page_count" > 300"#), "{sql}");
        assert!(sql.contains(r#""book"."page_count" <= 900"#), "{sql}");
        assert!(sql.contains(" AND "), "{sql}");
        assert!(sql.starts_with("SELECT DISTINCT"), "{sql}");
    }

    #[test]
    fn test_association_filter_adds_aliased_left_join() {
        let mut criteria = book::BookCriteria::default();
        criteria.genre_id().is_in = Some(vec![5, 9]);

        let spec = build(&criteria).unwrap();
        assert_eq!(spec.joins().len(), 1);
        assert_eq!(spec.joins()[0].alias, "genre_id_join");

        let sql = sql(&spec);
        assert!(sql.contains(r#"LEFT JOIN "book_genre" AS "genre_id_join""#), "{sql}");
        assert!(sql.contains(r#""genre_id_join"."genre_id" IN (5, 9)"#), "{sql}");
    }

    #[test]
    fn test_distinct_can_be_switched_off() {
        let mut criteria = book::BookCriteria::default();
        criteria.distinct = Some(false);
        criteria.genre_id().equals = Some(5);

        let spec = build(&criteria).unwrap();
        assert!(!spec.is_distinct());
        assert!(!sql(&spec).contains("DISTINCT"));
    }

    #[test]
    fn test_empty_in_matches_nothing_and_empty_not_in_everything() {
        let mut criteria = book::BookCriteria::default();
        criteria.id().is_in = Some(vec![]);
        assert!(sql(&build(&criteria).unwrap()).contains("1 = 0"));

        let mut criteria = book::BookCriteria::default();
        criteria.id().not_in = Some(vec![]);
        assert!(build(&criteria).unwrap().condition().is_empty());
    }

    #[test]
    fn test_specified_maps_to_null_checks() {
        let mut criteria = book::BookCriteria::default();
        criteria.isbn().specified = Some(false);
        criteria.published_date().specified = Some(true);

        let sql = sql(&build(&criteria).unwrap());
        assert!(sql.contains(r#""book"."isbn" IS NULL"#), "{sql}");
        assert!(sql.contains(r#""book"."published_date" IS NOT NULL"#), "{sql}");
    }

    #[test]
    fn test_case_insensitive_contains_folds_both_sides_in_sql() {
        let mut criteria = book::BookCriteria::default();
        criteria.title().contains = Some("café".into());
        criteria.isbn().does_not_contain = Some("x".into());

        let sql = sql(&build(&criteria).unwrap());
        assert!(
            sql.contains(r#"UPPER("book"."title") LIKE UPPER('%café%') ESCAPE '\'"#),
            "{sql}"
        );
        assert!(
            sql.contains(r#"UPPER("book"."isbn") NOT LIKE UPPER('%x%') ESCAPE '\'"#),
            "{sql}"
        );
    }

    #[test]
    fn test_case_insensitive_escape_literal_per_backend() {
        let mut criteria = book::BookCriteria::default();
        criteria.title().ends_with = Some("x".into());
        let options = BuildOptions {
            string_matching: StringMatching::CaseInsensitive,
            backend: DatabaseBackend::MySql,
        };

        let spec = build_specification(Some(&criteria), book::schema(), &options).unwrap();
        let sql = spec.select().build(DatabaseBackend::MySql).to_string();
        assert!(sql.contains(r"ESCAPE '\\'"), "{sql}");
    }

    #[test]
    fn test_join_skipped_when_operators_match_everything() {
        let mut criteria = book::BookCriteria::default();
        criteria.distinct = Some(false);
        criteria.genre_id().not_in = Some(vec![]);

        let spec = build(&criteria).unwrap();
        assert!(spec.joins().is_empty());
        assert!(spec.is_unrestricted());
        assert!(!sql(&spec).contains("JOIN"), "{}", sql(&spec));
    }

    #[test]
    fn test_case_sensitive_sqlite_uses_glob() {
        let mut criteria = book::BookCriteria::default();
        criteria.title().starts_with = Some("Du*".into());
        let options = BuildOptions {
            string_matching: StringMatching::CaseSensitive,
            backend: DatabaseBackend::Sqlite,
        };

        let spec = build_specification(Some(&criteria), book::schema(), &options).unwrap();
        let sql = spec.select().build(DatabaseBackend::Sqlite).to_string();
        assert!(sql.contains(r#""book"."title" GLOB 'Du[*]*'"#), "{sql}");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off", Anchor::Anywhere), r"%50\%\_off%");
        assert_eq!(like_pattern("a\\b", Anchor::Start), r"a\\b%");
        assert_eq!(glob_pattern("[x]?", Anchor::End), "*[[]x][?]");
    }

    #[test]
    fn test_ordering_on_unordered_attribute_is_invalid() {
        let mut criteria = book::BookCriteria::default();
        criteria.available = Some(crate::filter::BooleanFilter {
            equals: Some(true),
            ..Default::default()
        });
        assert!(build(&criteria).is_ok());

        let translated = translate(
            "available",
            &book::Column::Available.as_column_ref().into_column_ref(),
            AttributeKind::Boolean,
            &Operation::GreaterThan(true.into()),
            &BuildOptions::default(),
        );
        assert!(matches!(translated, Err(QueryError::InvalidFilter { .. })));
    }

    #[test]
    fn test_substring_on_non_text_is_invalid() {
        let translated = translate(
            "page_count",
            &book::Column::PageCount.as_column_ref().into_column_ref(),
            AttributeKind::Integer,
            &Operation::Contains("3".into()),
            &BuildOptions::default(),
        );
        let err = translated.unwrap_err();
        assert!(err.to_string().contains("needs a text attribute"));
    }

    #[test]
    fn test_unmapped_field_is_configuration_error() {
        let partial = EntitySchema::<book::Entity>::new().column("id", book::Column::Id);
        let mut criteria = book::BookCriteria::default();
        criteria.title().equals = Some("Dune".into());

        let err = build_specification(Some(&criteria), &partial, &BuildOptions::default())
            .unwrap_err();
        assert!(matches!(err, QueryError::Configuration(_)));

        // an unset field needs no mapping
        criteria.title = None;
        assert!(build_specification(Some(&criteria), &partial, &BuildOptions::default()).is_ok());
    }

    #[test]
    fn test_join_on_belongs_to_relation() {
        let mut criteria = rating::RatingCriteria::default();
        criteria.book_id().equals = Some(3);
        criteria.score().greater_than_or_equal = Some(4);

        let spec =
            build_specification(Some(&criteria), rating::schema(), &BuildOptions::default()).unwrap();
        let sql = spec.select().build(DatabaseBackend::Sqlite).to_string();
        assert!(sql.contains(r#"LEFT JOIN "book" AS "book_id_join""#), "{sql}");
        assert!(sql.contains(r#""book_id_join"."id" = 3"#), "{sql}");
    }

    #[test]
    fn test_string_range_operators_compare_exactly() {
        let mut criteria = author::AuthorCriteria::default();
        criteria.name = Some(StringFilter {
            greater_than_or_equal: Some("M".into()),
            not_equals: Some("Tolkien".into()),
            ..Default::default()
        });
        criteria.birth_year = Some(RangeFilter {
            less_than: Some(1950),
            ..Default::default()
        });

        let spec =
            build_specification(Some(&criteria), author::schema(), &BuildOptions::default()).unwrap();
        let sql = spec.select().build(DatabaseBackend::Sqlite).to_string();
        assert!(sql.contains(r#""author"."name" <> 'Tolkien'"#), "{sql}");
        assert!(sql.contains(r#""author"."name" >= 'M'"#), "{sql}");
        assert!(sql.contains(r#""author"."birth_year" < 1950"#), "{sql}");
    }
}
