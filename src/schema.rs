//! Static per-entity descriptors mapping criteria field names to columns or joins.
//!
//! A descriptor is built once at startup and never mutated:
//!
//! ```rust,ignore
//! static SCHEMA: LazyLock<EntitySchema<Entity>> = LazyLock::new(|| {
//!     EntitySchema::new()
//!         .column("title", Column::Title)
//!         .join("genre_id", || Relation::BookGenre.def(), book_genre::Column::GenreId)
//! });
//! ```

use sea_orm::sea_query::{Iden, TableRef};
use sea_orm::{ColumnTrait, ColumnType, EntityName, EntityTrait, JoinType, RelationDef};
use std::collections::HashSet;
use std::fmt::{self, Debug, Display};
use std::marker::PhantomData;

use crate::criteria::FieldDecl;
use crate::errors::{QueryError, QueryResult};
use crate::filter::FilterKind;

/// Broad type of a stored attribute, derived from its sea-orm column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Integer,
    Float,
    Decimal,
    Text,
    Boolean,
    Uuid,
    Temporal,
    Other,
}

impl AttributeKind {
    #[must_use]
    pub fn of(column_type: &ColumnType) -> Self {
        match column_type {
            ColumnType::Char(_) | ColumnType::String(_) | ColumnType::Text => Self::Text,
            ColumnType::TinyInteger
            | ColumnType::SmallInteger
            | ColumnType::Integer
            | ColumnType::BigInteger
            | ColumnType::TinyUnsigned
            | ColumnType::SmallUnsigned
            | ColumnType::Unsigned
            | ColumnType::BigUnsigned => Self::Integer,
            ColumnType::Float | ColumnType::Double => Self::Float,
            ColumnType::Decimal(_) | ColumnType::Money(_) => Self::Decimal,
            ColumnType::DateTime
            | ColumnType::Timestamp
            | ColumnType::TimestampWithTimeZone
            | ColumnType::Time
            | ColumnType::Date
            | ColumnType::Year => Self::Temporal,
            ColumnType::Boolean => Self::Boolean,
            ColumnType::Uuid => Self::Uuid,
            // enums, json, binary, arrays and custom types only support equality
            _ => Self::Other,
        }
    }

    #[must_use]
    pub fn of_column<C: ColumnTrait>(column: &C) -> Self {
        Self::of(column.def().get_column_type())
    }

    /// Whether `<`, `>` and friends are meaningful.
    #[must_use]
    pub fn is_ordered(self) -> bool {
        matches!(
            self,
            Self::Integer | Self::Float | Self::Decimal | Self::Text | Self::Temporal
        )
    }

    /// Whether a filter of the given family may target this attribute.
    #[must_use]
    pub fn accepts(self, filter: FilterKind) -> bool {
        match filter {
            FilterKind::String => self == Self::Text,
            FilterKind::Boolean => self == Self::Boolean,
            FilterKind::Range => self != Self::Boolean,
        }
    }
}

impl Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Uuid => "uuid",
            Self::Temporal => "temporal",
            Self::Other => "untyped",
        };
        f.write_str(name)
    }
}

/// Association filters always join with LEFT semantics so that a missing
/// association never excludes a row unless the filter itself asks for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Left,
}

impl JoinKind {
    #[must_use]
    pub fn join_type(self) -> JoinType {
        match self {
            Self::Left => JoinType::LeftJoin,
        }
    }
}

/// Join from the described entity to a related table, and the column filtered there.
#[derive(Debug, Clone)]
pub struct JoinSpec {
    pub relation: fn() -> RelationDef,
    pub kind: JoinKind,
    /// Table owning `target_column`; must be the table `relation` reaches.
    pub target_table: String,
    pub target_column: String,
    pub target_kind: AttributeKind,
}

impl JoinSpec {
    /// Table the relation joins to, without any alias.
    #[must_use]
    pub fn joined_table(&self) -> Option<String> {
        match (self.relation)().to_tbl {
            TableRef::Table(table)
            | TableRef::TableAlias(table, _)
            | TableRef::SchemaTable(_, table)
            | TableRef::SchemaTableAlias(_, table, _)
            | TableRef::DatabaseSchemaTable(_, _, table)
            | TableRef::DatabaseSchemaTableAlias(_, _, table, _) => Some(table.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum FieldTarget<C> {
    Column(C),
    Join(JoinSpec),
}

#[derive(Debug, Clone)]
pub struct FieldMapping<C> {
    pub name: &'static str,
    pub target: FieldTarget<C>,
}

impl<C: ColumnTrait> FieldMapping<C> {
    #[must_use]
    pub fn attribute_kind(&self) -> AttributeKind {
        match &self.target {
            FieldTarget::Column(column) => AttributeKind::of_column(column),
            FieldTarget::Join(join) => join.target_kind,
        }
    }
}

/// Read-only mapping from criteria field names to attribute paths of `E`.
pub struct EntitySchema<E: EntityTrait> {
    fields: Vec<FieldMapping<E::Column>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: EntityTrait> Default for EntitySchema<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityTrait> EntitySchema<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            _entity: PhantomData,
        }
    }

    /// Map `name` to a column of the entity itself.
    #[must_use]
    pub fn column(mut self, name: &'static str, column: E::Column) -> Self {
        self.fields.push(FieldMapping {
            name,
            target: FieldTarget::Column(column),
        });
        self
    }

    /// Map `name` to `target` on the table reached through `relation`.
    #[must_use]
    pub fn join<T: ColumnTrait>(
        mut self,
        name: &'static str,
        relation: fn() -> RelationDef,
        target: T,
    ) -> Self {
        self.fields.push(FieldMapping {
            name,
            target: FieldTarget::Join(JoinSpec {
                relation,
                kind: JoinKind::Left,
                target_table: EntityName::table_name(&T::EntityName::default()).to_owned(),
                target_column: target.as_str().to_owned(),
                target_kind: AttributeKind::of_column(&target),
            }),
        });
        self
    }

    #[must_use]
    pub fn table_name(&self) -> String {
        E::default().table_name().to_owned()
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldMapping<E::Column>] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldMapping<E::Column>> {
        self.fields.iter().find(|mapping| mapping.name == name)
    }

    /// Column a result page can be ordered by; joined fields are not sortable.
    #[must_use]
    pub fn sort_column(&self, name: &str) -> Option<E::Column> {
        match &self.field(name)?.target {
            FieldTarget::Column(column) => Some(*column),
            FieldTarget::Join(_) => None,
        }
    }

    /// Check that every declared criteria field is mapped exactly once, to an
    /// attribute its filter family can handle, and that every join targets a
    /// column of the table its relation reaches.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Configuration`] naming the first mismatch.
    pub fn validate(&self, declared: &[FieldDecl]) -> QueryResult<()> {
        let mut seen = HashSet::new();
        for mapping in &self.fields {
            if !seen.insert(mapping.name) {
                return Err(QueryError::configuration(format!(
                    "field `{}` is mapped twice in the {} schema",
                    mapping.name,
                    self.table_name()
                )));
            }
            if let FieldTarget::Join(join) = &mapping.target {
                let joined = join.joined_table();
                if joined.as_deref() != Some(join.target_table.as_str()) {
                    return Err(QueryError::configuration(format!(
                        "field `{}` filters `{}.{}` but its relation joins `{}` in the {} schema",
                        mapping.name,
                        join.target_table,
                        join.target_column,
                        joined.unwrap_or_default(),
                        self.table_name()
                    )));
                }
            }
        }

        for decl in declared {
            let mapping = self.field(decl.name).ok_or_else(|| {
                QueryError::configuration(format!(
                    "field `{}` is not mapped in the {} schema",
                    decl.name,
                    self.table_name()
                ))
            })?;
            let attribute = mapping.attribute_kind();
            if !attribute.accepts(decl.kind) {
                return Err(QueryError::configuration(format!(
                    "field `{}` uses a {} filter but is mapped to a {attribute} attribute in the {} schema",
                    decl.name,
                    decl.kind,
                    self.table_name()
                )));
            }
        }
        Ok(())
    }
}

impl<E: EntityTrait> Debug for EntitySchema<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntitySchema")
            .field("table", &self.table_name())
            .field(
                "fields",
                &self.fields.iter().map(|m| m.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}
