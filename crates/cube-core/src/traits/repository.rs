//! Generic repository traits for entity persistence.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::pagination::{PageRequest, PageResponse};

/// Generic CRUD repository trait.
///
/// Each entity gets a strongly typed repository; both the PostgreSQL and
/// the in-memory stores implement it so that callers stay agnostic of the
/// backend. "Not found" is `Ok(None)`, never an error.
#[async_trait]
pub trait Repository<Entity, Id>: Send + Sync + 'static
where
    Entity: Send + Sync + 'static + serde::Serialize,
    Id: Send + Sync + 'static,
{
    /// Find an entity by its primary key.
    async fn find_by_id(&self, id: &Id) -> AppResult<Option<Entity>>;

    /// Find all entities with pagination.
    async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<Entity>>;

    /// Create a new entity and return it with its assigned key.
    async fn create(&self, entity: &Entity) -> AppResult<Entity>;

    /// Update an existing entity and return the updated version.
    async fn update(&self, entity: &Entity) -> AppResult<Entity>;

    /// Delete an entity by its primary key. Returns `true` if deleted.
    async fn delete(&self, id: &Id) -> AppResult<bool>;

    /// Count total entities.
    async fn count(&self) -> AppResult<u64>;
}

/// Lookup by unique, case-insensitive name.
#[async_trait]
pub trait NamedRepository<Entity>: Send + Sync + 'static
where
    Entity: Send + Sync + 'static,
{
    /// Find an entity by its unique name.
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Entity>>;
}
