use std::sync::Arc;

use thiserror::Error;

use shipyard_core::{ExpectedVersion, ShipId};
use shipyard_ships::{NewShip, PageRequest, Ship, ShipFilter, ShipOrder};

/// Store error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The row to update does not exist (anymore).
    #[error("ship not found: {0}")]
    NotFound(ShipId),

    /// The row changed since it was read.
    #[error("concurrency conflict: {0}")]
    Conflict(String),

    /// A stored row could not be mapped back to a ship.
    #[error("corrupt row: {0}")]
    CorruptRow(String),

    /// Connection, constraint or other backend failure.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Relational CRUD + predicate-based queries over ship records.
///
/// Writes touch exactly one row. `update` is a whole-row replace that only
/// succeeds while the stored version still satisfies `expected`; on success the
/// stored version is bumped and returned in the ship.
#[async_trait::async_trait]
pub trait ShipStore: Send + Sync {
    /// Insert a new ship, assigning its id.
    async fn insert(&self, ship: NewShip) -> Result<Ship, StoreError>;

    async fn get(&self, id: ShipId) -> Result<Option<Ship>, StoreError>;

    /// One page of the ships matching `filter`, sorted by `order`.
    async fn find(
        &self,
        filter: &ShipFilter,
        order: ShipOrder,
        page: PageRequest,
    ) -> Result<Vec<Ship>, StoreError>;

    /// Number of ships matching `filter`, ignoring paging.
    async fn count(&self, filter: &ShipFilter) -> Result<u64, StoreError>;

    async fn update(&self, ship: &Ship, expected: ExpectedVersion) -> Result<Ship, StoreError>;

    /// Hard delete. Returns `false` if no row had that id.
    async fn delete(&self, id: ShipId) -> Result<bool, StoreError>;
}

#[async_trait::async_trait]
impl<S> ShipStore for Arc<S>
where
    S: ShipStore + ?Sized,
{
    async fn insert(&self, ship: NewShip) -> Result<Ship, StoreError> {
        (**self).insert(ship).await
    }

    async fn get(&self, id: ShipId) -> Result<Option<Ship>, StoreError> {
        (**self).get(id).await
    }

    async fn find(
        &self,
        filter: &ShipFilter,
        order: ShipOrder,
        page: PageRequest,
    ) -> Result<Vec<Ship>, StoreError> {
        (**self).find(filter, order, page).await
    }

    async fn count(&self, filter: &ShipFilter) -> Result<u64, StoreError> {
        (**self).count(filter).await
    }

    async fn update(&self, ship: &Ship, expected: ExpectedVersion) -> Result<Ship, StoreError> {
        (**self).update(ship, expected).await
    }

    async fn delete(&self, id: ShipId) -> Result<bool, StoreError> {
        (**self).delete(id).await
    }
}
