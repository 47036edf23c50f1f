//! Repository boundary: how a data source consumes specifications.
//!
//! Repositories execute filters; they never own business rules. A caller hands
//! over a [`Specification`], the repository asks it for its expression and
//! applies that expression while retrieving data (translated into the backend's
//! native filter form where one exists).

use std::sync::Arc;

use thiserror::Error;

use crate::entity::Entity;
use crate::expr::{Expr, Record};
use crate::specification::Specification;

/// Boxed error from the underlying data source.
pub type SourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Data-access failure.
///
/// "Not found" is not an error: lookups return `Ok(None)`.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Failure reported by the data source (connectivity, timeout, storage).
    ///
    /// The source error is carried as-is; downcast it to inspect backend detail.
    #[error(transparent)]
    DataAccess(SourceError),

    /// A stored record could not be materialized as an entity.
    #[error("failed to decode stored record: {0}")]
    Decode(String),

    /// An in-process store's lock was poisoned by a panicking writer.
    #[error("repository lock poisoned")]
    Poisoned,
}

impl RepositoryError {
    pub fn data_access(err: impl Into<SourceError>) -> Self {
        Self::DataAccess(err.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

/// Read access to a collection of `T`, filtered by specifications.
///
/// Retrieval may suspend; dropping the returned future cancels it.
#[async_trait::async_trait]
pub trait Repository<T>: Send + Sync
where
    T: Entity + Record + Send + 'static,
{
    /// Fetch one entity by identity. Absent entities yield `Ok(None)`.
    async fn get_one(&self, id: &T::Id) -> Result<Option<T>, RepositoryError>;

    /// All entities matching a raw expression. Result order is unspecified.
    async fn find(&self, filter: &Expr<T::Field>) -> Result<Vec<T>, RepositoryError>;

    /// All entities satisfying `spec`. Result order is unspecified; an empty
    /// result is not an error.
    async fn get_many(&self, spec: &dyn Specification<T>) -> Result<Vec<T>, RepositoryError> {
        let filter = spec.to_expression();
        self.find(&filter).await
    }
}

#[async_trait::async_trait]
impl<T, R> Repository<T> for Arc<R>
where
    T: Entity + Record + Send + 'static,
    R: Repository<T> + ?Sized,
{
    async fn get_one(&self, id: &T::Id) -> Result<Option<T>, RepositoryError> {
        (**self).get_one(id).await
    }

    async fn find(&self, filter: &Expr<T::Field>) -> Result<Vec<T>, RepositoryError> {
        (**self).find(filter).await
    }

    async fn get_many(&self, spec: &dyn Specification<T>) -> Result<Vec<T>, RepositoryError> {
        (**self).get_many(spec).await
    }
}
