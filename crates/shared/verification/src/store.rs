//! Storage port used by the verification run.

use async_trait::async_trait;

use common::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Persists an entity and reloads it by identity.
///
/// Implementations must not serve `reload` from anything the `persist`
/// call left in memory; the reloaded entity has to come from storage.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait EntityStore<T: Send + Sync + 'static>: Send + Sync {
    /// Write the entity as a new row
    async fn persist(&self, entity: T) -> AppResult<()>;

    /// Load the stored row carrying the identity of `entity`
    async fn reload(&self, entity: &T) -> AppResult<Option<T>>;
}
