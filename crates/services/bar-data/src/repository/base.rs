//! Generic repository traits over SeaORM entities.
//!
//! Reads, writes and deletes are separate traits; an entity repository
//! implements the ones it needs by handing out its connection, and picks up
//! `CrudRepository` once it has all three.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    IntoActiveModel, PaginatorTrait, PrimaryKeyTrait,
};
use std::fmt::Debug;

use common::{AppResult, OptionExt, PaginationParams};

/// Primary key value of entity `E`
pub type PrimaryKeyOf<E> = <<E as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType;

/// Queries
#[async_trait]
pub trait ReadRepository<E, M>: Send + Sync
where
    E: EntityTrait<Model = M>,
    M: Send + Sync + FromQueryResult,
{
    /// Get database connection reference
    fn db(&self) -> &DatabaseConnection;

    /// Find entity by primary key
    async fn find_by_id(&self, id: PrimaryKeyOf<E>) -> AppResult<Option<M>>
    where
        PrimaryKeyOf<E>: Clone + Send,
    {
        E::find_by_id(id).one(self.db()).await.map_err(Into::into)
    }

    /// Get entity by primary key, failing with `NotFound` when absent
    async fn get_by_id(&self, id: PrimaryKeyOf<E>) -> AppResult<M>
    where
        PrimaryKeyOf<E>: Clone + Send,
    {
        self.find_by_id(id).await?.ok_or_not_found()
    }

    /// Whether a row with this primary key exists
    async fn exists(&self, id: PrimaryKeyOf<E>) -> AppResult<bool>
    where
        PrimaryKeyOf<E>: Clone + Send,
    {
        Ok(self.find_by_id(id).await?.is_some())
    }

    /// Find all entities
    async fn find_all(&self) -> AppResult<Vec<M>> {
        E::find().all(self.db()).await.map_err(Into::into)
    }

    /// Find entities with pagination, returning the page and the total count
    async fn find_paginated(&self, params: &PaginationParams) -> AppResult<(Vec<M>, u64)> {
        let paginator = E::find().paginate(self.db(), params.limit());
        let total = paginator.num_items().await?;
        let data = paginator.fetch_page(params.page.saturating_sub(1)).await?;
        Ok((data, total))
    }

    /// Count all entities
    async fn count(&self) -> AppResult<u64> {
        E::find()
            .paginate(self.db(), 1)
            .num_items()
            .await
            .map_err(Into::into)
    }
}

/// Inserts and updates
#[async_trait]
pub trait WriteRepository<E, M, A>: Send + Sync
where
    E: EntityTrait<Model = M>,
    M: Send + Sync + IntoActiveModel<A>,
    A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + 'static,
{
    /// Get database connection reference
    fn db(&self) -> &DatabaseConnection;

    /// Insert a new row and return it as stored
    async fn insert(&self, model: A) -> AppResult<M>
    where
        <<A as ActiveModelTrait>::Entity as EntityTrait>::Model: Send,
    {
        model.insert(self.db()).await.map_err(Into::into)
    }

    /// Update the changed columns of an existing row
    async fn update(&self, model: A) -> AppResult<M>
    where
        <<A as ActiveModelTrait>::Entity as EntityTrait>::Model: Send,
    {
        model.update(self.db()).await.map_err(Into::into)
    }
}

/// Deletes
#[async_trait]
pub trait DeleteRepository<E>: Send + Sync
where
    E: EntityTrait,
{
    /// Get database connection reference
    fn db(&self) -> &DatabaseConnection;

    /// Delete entity by primary key, returning the number of rows removed
    async fn delete_by_id(&self, id: PrimaryKeyOf<E>) -> AppResult<u64>
    where
        PrimaryKeyOf<E>: Clone + Send + Debug,
    {
        let result = E::delete_by_id(id).exec(self.db()).await?;
        Ok(result.rows_affected)
    }
}

/// Full CRUD repository
pub trait CrudRepository<E, M, A>:
    ReadRepository<E, M> + WriteRepository<E, M, A> + DeleteRepository<E>
where
    E: EntityTrait<Model = M>,
    M: Send + Sync + FromQueryResult + IntoActiveModel<A>,
    A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + 'static,
{
}

impl<T, E, M, A> CrudRepository<E, M, A> for T
where
    T: ReadRepository<E, M> + WriteRepository<E, M, A> + DeleteRepository<E>,
    E: EntityTrait<Model = M>,
    M: Send + Sync + FromQueryResult + IntoActiveModel<A>,
    A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + 'static,
{
}
