use std::collections::HashMap;
use std::sync::RwLock;

use cinema_core::{Entity, Expr, Record, Repository, RepositoryError};

/// In-memory repository for tests/dev.
///
/// Filters by evaluating the expression tree against each stored entity, the
/// same path `SpecificationExt::is_satisfied_by` takes.
#[derive(Debug)]
pub struct InMemoryRepository<T: Entity> {
    entities: RwLock<HashMap<T::Id, T>>,
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(HashMap::new()),
        }
    }

    /// Build a repository pre-loaded with `entities`. Later duplicates of an id
    /// replace earlier ones.
    pub fn with_entities(entities: impl IntoIterator<Item = T>) -> Self {
        let map = entities
            .into_iter()
            .map(|e| (e.id().clone(), e))
            .collect();
        Self {
            entities: RwLock::new(map),
        }
    }

    /// Store `entity`, replacing any entity with the same id.
    ///
    /// This is the persistence boundary; the domain itself never writes.
    pub fn insert(&self, entity: T) -> Result<(), RepositoryError> {
        let mut map = self.entities.write().map_err(|_| RepositoryError::Poisoned)?;
        map.insert(entity.id().clone(), entity);
        Ok(())
    }

    pub fn len(&self) -> Result<usize, RepositoryError> {
        let map = self.entities.read().map_err(|_| RepositoryError::Poisoned)?;
        Ok(map.len())
    }

    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.len()? == 0)
    }
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl<T> Repository<T> for InMemoryRepository<T>
where
    T: Entity + Record + Clone + Send + Sync + 'static,
{
    async fn get_one(&self, id: &T::Id) -> Result<Option<T>, RepositoryError> {
        let map = self.entities.read().map_err(|_| RepositoryError::Poisoned)?;
        Ok(map.get(id).cloned())
    }

    async fn find(&self, filter: &Expr<T::Field>) -> Result<Vec<T>, RepositoryError> {
        let map = self.entities.read().map_err(|_| RepositoryError::Poisoned)?;
        let matches: Vec<T> = map
            .values()
            .filter(|entity| filter.evaluate(*entity))
            .cloned()
            .collect();

        tracing::debug!(filter = %filter, matched = matches.len(), total = map.len(), "in-memory filter applied");
        Ok(matches)
    }
}
