use sea_orm::EntityTrait;
use std::marker::PhantomData;

use crate::criteria::{Criteria, ModelOf};
use crate::errors::QueryResult;
use crate::pagination::{Page, PageRequest};
use crate::repository::{PrimaryKeyValue, Repository};
use crate::schema::EntitySchema;
use crate::specification::{BuildOptions, Specification, build_specification};

type ColumnOf<C> = <<C as Criteria>::Entity as EntityTrait>::Column;

/// Read-side query service for one entity.
///
/// Holds no state between calls besides the repository handle and the static
/// schema; every call compiles a fresh [`Specification`].
#[derive(Debug)]
pub struct QueryService<C: Criteria, R> {
    repository: R,
    schema: &'static EntitySchema<C::Entity>,
    options: BuildOptions,
    _criteria: PhantomData<fn() -> C>,
}

impl<C, R> QueryService<C, R>
where
    C: Criteria,
    R: Repository<C::Entity>,
{
    /// Create the service, checking the criteria's schema first.
    ///
    /// # Errors
    ///
    /// [`QueryError::Configuration`](crate::errors::QueryError::Configuration)
    /// when the schema does not cover every criteria field.
    pub fn new(repository: R, options: BuildOptions) -> QueryResult<Self> {
        let schema = C::schema();
        schema.validate(C::FIELDS)?;
        Ok(Self {
            repository,
            schema,
            options,
            _criteria: PhantomData,
        })
    }

    #[must_use]
    pub fn repository(&self) -> &R {
        &self.repository
    }

    #[must_use]
    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Compile `criteria` into a specification; used by both reads below.
    ///
    /// # Errors
    ///
    /// See [`build_specification`].
    pub fn specification(&self, criteria: Option<&C>) -> QueryResult<Specification<C::Entity>> {
        build_specification(criteria, self.schema, &self.options)
    }

    /// One page of the entities matching `criteria`.
    ///
    /// # Errors
    ///
    /// Invalid criteria or a failed repository call.
    pub async fn find_page(
        &self,
        criteria: Option<&C>,
        page: &PageRequest<ColumnOf<C>>,
    ) -> QueryResult<Page<ModelOf<C>>> {
        tracing::debug!(?criteria, page = page.page, size = page.size, "find by criteria");
        let spec = self.specification(criteria)?;
        Ok(self.repository.find_all(&spec, page).await?)
    }

    /// Number of entities matching `criteria`.
    ///
    /// # Errors
    ///
    /// Invalid criteria or a failed repository call.
    pub async fn count(&self, criteria: Option<&C>) -> QueryResult<u64> {
        tracing::debug!(?criteria, "count by criteria");
        let spec = self.specification(criteria)?;
        Ok(self.repository.count(&spec).await?)
    }

    /// # Errors
    ///
    /// A failed repository call.
    pub async fn find_by_id(
        &self,
        id: PrimaryKeyValue<C::Entity>,
    ) -> QueryResult<Option<ModelOf<C>>> {
        tracing::debug!(?id, "find by id");
        Ok(self.repository.find_by_id(id).await?)
    }
}
