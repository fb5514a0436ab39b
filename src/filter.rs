//! # Filter Values
//!
//! Typed operator bundles describing the constraints placed on one attribute.
//! A filter holds data only: every operator is an independent `Option`, and a
//! predicate built from a filter ANDs together every operator that is set.
//!
//! - [`RangeFilter<T>`]: equality, set membership, ordering and presence
//! - [`StringFilter`]: everything a `RangeFilter<String>` has plus substring operators
//! - [`BooleanFilter`]: equality and presence
//!
//! Filters are usually bound from query parameters such as
//! `pageCount.greaterThan=300` or `genreId.in=5,9`; see [`Filter::bind`].
//! Text operands are kept verbatim, surrounding whitespace included; every
//! other operand is trimmed before it is parsed.

use sea_orm::Value;
use std::fmt::{self, Debug, Display};
use std::str::FromStr;

/// Filter family, used to check a criteria field against the attribute it is mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Range,
    String,
    Boolean,
}

impl Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range => f.write_str("range"),
            Self::String => f.write_str("string"),
            Self::Boolean => f.write_str("boolean"),
        }
    }
}

/// A single set operator with its value, ready to be translated into SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Equals(Value),
    NotEquals(Value),
    In(Vec<Value>),
    NotIn(Vec<Value>),
    GreaterThan(Value),
    GreaterThanOrEqual(Value),
    LessThan(Value),
    LessThanOrEqual(Value),
    Contains(String),
    DoesNotContain(String),
    StartsWith(String),
    EndsWith(String),
    /// `true`: attribute must be present, `false`: attribute must be null.
    Specified(bool),
}

impl Operation {
    /// Wire name of the operator
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Equals(_) => "equals",
            Self::NotEquals(_) => "notEquals",
            Self::In(_) => "in",
            Self::NotIn(_) => "notIn",
            Self::GreaterThan(_) => "greaterThan",
            Self::GreaterThanOrEqual(_) => "greaterThanOrEqual",
            Self::LessThan(_) => "lessThan",
            Self::LessThanOrEqual(_) => "lessThanOrEqual",
            Self::Contains(_) => "contains",
            Self::DoesNotContain(_) => "doesNotContain",
            Self::StartsWith(_) => "startsWith",
            Self::EndsWith(_) => "endsWith",
            Self::Specified(_) => "specified",
        }
    }

    /// Operators that need a total order on the attribute.
    #[must_use]
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Self::GreaterThan(_)
                | Self::GreaterThanOrEqual(_)
                | Self::LessThan(_)
                | Self::LessThanOrEqual(_)
        )
    }

    /// Operators that only make sense on text attributes.
    #[must_use]
    pub fn is_substring(&self) -> bool {
        matches!(
            self,
            Self::Contains(_) | Self::DoesNotContain(_) | Self::StartsWith(_) | Self::EndsWith(_)
        )
    }
}

/// Object-safe view of a filter used by the specification builder.
pub trait FilterOps: Debug + Send + Sync {
    fn kind(&self) -> FilterKind;

    /// Every set operator, in a fixed order: equals, notEquals, in, notIn,
    /// greaterThan, greaterThanOrEqual, lessThan, lessThanOrEqual, contains,
    /// doesNotContain, startsWith, endsWith, specified.
    fn operations(&self) -> Vec<Operation>;

    fn is_empty(&self) -> bool {
        self.operations().is_empty()
    }
}

/// A concrete filter type that can live in a criteria struct.
pub trait Filter: FilterOps + Default + Clone + PartialEq {
    const KIND: FilterKind;

    /// Set one operator from its wire name and raw query-string value.
    ///
    /// `in`/`notIn` take comma-separated values and append on repeated keys;
    /// an empty value is the empty set. String operands, list items included,
    /// are stored exactly as given; numbers, dates and booleans are trimmed
    /// first.
    ///
    /// # Errors
    ///
    /// Returns a human readable reason when the operator is unknown for this
    /// filter type or the value does not parse.
    fn bind(&mut self, operator: &str, raw: &str) -> Result<(), String>;

    /// Value-wise clone sharing no state with `self`.
    #[must_use]
    fn copy(&self) -> Self {
        self.clone()
    }
}

fn parse_value<T>(raw: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| format!("cannot parse `{raw}`: {e}"))
}

fn parse_list<T>(raw: &str) -> Result<Vec<T>, String>
where
    T: FromStr,
    T::Err: Display,
{
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    raw.split(',').map(parse_value).collect()
}

#[allow(clippy::unnecessary_wraps)]
fn verbatim(raw: &str) -> Result<String, String> {
    Ok(raw.to_string())
}

#[allow(clippy::unnecessary_wraps)]
fn verbatim_list(raw: &str) -> Result<Vec<String>, String> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    Ok(raw.split(',').map(str::to_string).collect())
}

fn append<T>(slot: &mut Option<Vec<T>>, values: Vec<T>) {
    slot.get_or_insert_with(Vec::new).extend(values);
}

fn unknown_operator(operator: &str, kind: FilterKind) -> String {
    format!("unknown operator `{operator}` for a {kind} filter")
}

fn values<T: Clone + Into<Value>>(items: &[T]) -> Vec<Value> {
    items.iter().cloned().map(Into::into).collect()
}

// Both range-shaped filters share these field names.
macro_rules! push_range_operations {
    ($ops:ident, $filter:expr) => {
        if let Some(v) = &$filter.equals {
            $ops.push(Operation::Equals(v.clone().into()));
        }
        if let Some(v) = &$filter.not_equals {
            $ops.push(Operation::NotEquals(v.clone().into()));
        }
        if let Some(list) = &$filter.is_in {
            $ops.push(Operation::In(values(list)));
        }
        if let Some(list) = &$filter.not_in {
            $ops.push(Operation::NotIn(values(list)));
        }
        if let Some(v) = &$filter.greater_than {
            $ops.push(Operation::GreaterThan(v.clone().into()));
        }
        if let Some(v) = &$filter.greater_than_or_equal {
            $ops.push(Operation::GreaterThanOrEqual(v.clone().into()));
        }
        if let Some(v) = &$filter.less_than {
            $ops.push(Operation::LessThan(v.clone().into()));
        }
        if let Some(v) = &$filter.less_than_or_equal {
            $ops.push(Operation::LessThanOrEqual(v.clone().into()));
        }
    };
}

// `$value` parses a single operand and `$list` an `in`/`notIn` list;
// `specified` is always a boolean.
macro_rules! bind_range_operator {
    ($filter:expr, $operator:expr, $raw:expr, $value:path, $list:path) => {
        match $operator {
            "equals" => {
                $filter.equals = Some($value($raw)?);
                true
            }
            "notEquals" => {
                $filter.not_equals = Some($value($raw)?);
                true
            }
            "in" => {
                append(&mut $filter.is_in, $list($raw)?);
                true
            }
            "notIn" => {
                append(&mut $filter.not_in, $list($raw)?);
                true
            }
            "greaterThan" => {
                $filter.greater_than = Some($value($raw)?);
                true
            }
            "greaterThanOrEqual" => {
                $filter.greater_than_or_equal = Some($value($raw)?);
                true
            }
            "lessThan" => {
                $filter.less_than = Some($value($raw)?);
                true
            }
            "lessThanOrEqual" => {
                $filter.less_than_or_equal = Some($value($raw)?);
                true
            }
            "specified" => {
                $filter.specified = Some(parse_value($raw)?);
                true
            }
            _ => false,
        }
    };
}

/// Filter for attributes with equality and (usually) a total order:
/// identifiers, numbers, dates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RangeFilter<T> {
    pub equals: Option<T>,
    pub not_equals: Option<T>,
    pub is_in: Option<Vec<T>>,
    pub not_in: Option<Vec<T>>,
    pub greater_than: Option<T>,
    pub greater_than_or_equal: Option<T>,
    pub less_than: Option<T>,
    pub less_than_or_equal: Option<T>,
    pub specified: Option<bool>,
}

impl<T> Default for RangeFilter<T> {
    fn default() -> Self {
        Self {
            equals: None,
            not_equals: None,
            is_in: None,
            not_in: None,
            greater_than: None,
            greater_than_or_equal: None,
            less_than: None,
            less_than_or_equal: None,
            specified: None,
        }
    }
}

impl<T> FilterOps for RangeFilter<T>
where
    T: Clone + Into<Value> + Debug + Send + Sync,
{
    fn kind(&self) -> FilterKind {
        FilterKind::Range
    }

    fn operations(&self) -> Vec<Operation> {
        let mut ops = Vec::new();
        push_range_operations!(ops, self);
        if let Some(specified) = self.specified {
            ops.push(Operation::Specified(specified));
        }
        ops
    }
}

impl<T> Filter for RangeFilter<T>
where
    T: Clone + Into<Value> + Debug + Send + Sync + PartialEq + FromStr,
    T::Err: Display,
{
    const KIND: FilterKind = FilterKind::Range;

    fn bind(&mut self, operator: &str, raw: &str) -> Result<(), String> {
        if bind_range_operator!(self, operator, raw, parse_value, parse_list) {
            Ok(())
        } else {
            Err(unknown_operator(operator, Self::KIND))
        }
    }
}

/// Filter for text attributes.
///
/// Substring operators follow the configured
/// [`StringMatching`](crate::specification::StringMatching); equality and
/// ordering are always exact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StringFilter {
    pub equals: Option<String>,
    pub not_equals: Option<String>,
    pub is_in: Option<Vec<String>>,
    pub not_in: Option<Vec<String>>,
    pub greater_than: Option<String>,
    pub greater_than_or_equal: Option<String>,
    pub less_than: Option<String>,
    pub less_than_or_equal: Option<String>,
    pub contains: Option<String>,
    pub does_not_contain: Option<String>,
    pub starts_with: Option<String>,
    pub ends_with: Option<String>,
    pub specified: Option<bool>,
}

impl FilterOps for StringFilter {
    fn kind(&self) -> FilterKind {
        FilterKind::String
    }

    fn operations(&self) -> Vec<Operation> {
        let mut ops = Vec::new();
        push_range_operations!(ops, self);
        if let Some(v) = &self.contains {
            ops.push(Operation::Contains(v.clone()));
        }
        if let Some(v) = &self.does_not_contain {
            ops.push(Operation::DoesNotContain(v.clone()));
        }
        if let Some(v) = &self.starts_with {
            ops.push(Operation::StartsWith(v.clone()));
        }
        if let Some(v) = &self.ends_with {
            ops.push(Operation::EndsWith(v.clone()));
        }
        if let Some(specified) = self.specified {
            ops.push(Operation::Specified(specified));
        }
        ops
    }
}

impl Filter for StringFilter {
    const KIND: FilterKind = FilterKind::String;

    fn bind(&mut self, operator: &str, raw: &str) -> Result<(), String> {
        if bind_range_operator!(self, operator, raw, verbatim, verbatim_list) {
            return Ok(());
        }
        let slot = match operator {
            "contains" => &mut self.contains,
            "doesNotContain" | "notContains" => &mut self.does_not_contain,
            "startsWith" => &mut self.starts_with,
            "endsWith" => &mut self.ends_with,
            _ => return Err(unknown_operator(operator, Self::KIND)),
        };
        *slot = Some(raw.to_string());
        Ok(())
    }
}

/// Filter for boolean attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BooleanFilter {
    pub equals: Option<bool>,
    pub not_equals: Option<bool>,
    pub specified: Option<bool>,
}

impl FilterOps for BooleanFilter {
    fn kind(&self) -> FilterKind {
        FilterKind::Boolean
    }

    fn operations(&self) -> Vec<Operation> {
        let mut ops = Vec::new();
        if let Some(v) = self.equals {
            ops.push(Operation::Equals(v.into()));
        }
        if let Some(v) = self.not_equals {
            ops.push(Operation::NotEquals(v.into()));
        }
        if let Some(specified) = self.specified {
            ops.push(Operation::Specified(specified));
        }
        ops
    }
}

impl Filter for BooleanFilter {
    const KIND: FilterKind = FilterKind::Boolean;

    fn bind(&mut self, operator: &str, raw: &str) -> Result<(), String> {
        let slot = match operator {
            "equals" => &mut self.equals,
            "notEquals" => &mut self.not_equals,
            "specified" => &mut self.specified,
            _ => return Err(unknown_operator(operator, Self::KIND)),
        };
        *slot = Some(parse_value(raw)?);
        Ok(())
    }
}
