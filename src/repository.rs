use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, Iterable, PaginatorTrait, PrimaryKeyToColumn, PrimaryKeyTrait, QueryOrder,
    QuerySelect, TryIntoModel,
};
use std::marker::PhantomData;

use crate::pagination::{Page, PageRequest};
use crate::specification::Specification;

/// Primary key value type of an entity.
pub type PrimaryKeyValue<E> = <<E as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType;

/// Storage operations the query service relies on.
#[async_trait]
pub trait Repository<E: EntityTrait>: Send + Sync {
    /// One page of the rows matching `spec`, with the total match count.
    async fn find_all(
        &self,
        spec: &Specification<E>,
        page: &PageRequest<E::Column>,
    ) -> Result<Page<E::Model>, DbErr>;

    async fn count(&self, spec: &Specification<E>) -> Result<u64, DbErr>;

    async fn exists_by_id(&self, id: PrimaryKeyValue<E>) -> Result<bool, DbErr>;

    async fn find_by_id(&self, id: PrimaryKeyValue<E>) -> Result<Option<E::Model>, DbErr>;

    /// Insert or update, returning the stored row.
    async fn save(&self, model: E::ActiveModel) -> Result<E::Model, DbErr>;

    /// # Errors
    ///
    /// `DbErr::RecordNotFound` when no row has this id.
    async fn delete_by_id(&self, id: PrimaryKeyValue<E>) -> Result<(), DbErr>;
}

/// [`Repository`] over a sea-orm connection.
#[derive(Debug, Clone)]
pub struct SeaOrmRepository<E> {
    db: DatabaseConnection,
    _entity: PhantomData<fn() -> E>,
}

impl<E> SeaOrmRepository<E> {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl<E> Repository<E> for SeaOrmRepository<E>
where
    E: EntityTrait + Sync,
    E::Model: Sync + IntoActiveModel<E::ActiveModel>,
    E::ActiveModel: ActiveModelTrait<Entity = E>
        + ActiveModelBehavior
        + TryIntoModel<E::Model>
        + Send
        + Sync,
{
    async fn find_all(
        &self,
        spec: &Specification<E>,
        page: &PageRequest<E::Column>,
    ) -> Result<Page<E::Model>, DbErr> {
        let select = spec.select();
        let total = PaginatorTrait::count(select.clone(), &self.db).await?;

        let mut ordered = select;
        for (column, order) in &page.sort {
            ordered = ordered.order_by(*column, order.clone());
        }
        for key in E::PrimaryKey::iter() {
            ordered = ordered.order_by_asc(key.into_column());
        }

        let content = ordered
            .offset(page.offset())
            .limit(page.size)
            .all(&self.db)
            .await?;
        Ok(Page::new(content, page.page, page.size, total))
    }

    async fn count(&self, spec: &Specification<E>) -> Result<u64, DbErr> {
        PaginatorTrait::count(spec.select(), &self.db).await
    }

    async fn exists_by_id(&self, id: PrimaryKeyValue<E>) -> Result<bool, DbErr> {
        let found = PaginatorTrait::count(E::find_by_id(id), &self.db).await?;
        Ok(found > 0)
    }

    async fn find_by_id(&self, id: PrimaryKeyValue<E>) -> Result<Option<E::Model>, DbErr> {
        E::find_by_id(id).one(&self.db).await
    }

    async fn save(&self, model: E::ActiveModel) -> Result<E::Model, DbErr> {
        model.save(&self.db).await?.try_into_model()
    }

    async fn delete_by_id(&self, id: PrimaryKeyValue<E>) -> Result<(), DbErr> {
        let res = E::delete_by_id(id).exec(&self.db).await?;
        match res.rows_affected {
            0 => Err(DbErr::RecordNotFound(format!(
                "{} not found",
                E::default().table_name()
            ))),
            _ => Ok(()),
        }
    }
}
