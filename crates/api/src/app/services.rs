//! Ship service: request-level orchestration over a [`ShipStore`].
//!
//! Validation always runs before persistence, so a rejected request never
//! writes. Updates read the current row, merge the patch and write it back
//! only if the row's version has not moved in between.

use std::sync::Arc;

use shipyard_core::{DomainError, Entity, ExpectedVersion, ShipId};
use shipyard_infra::store::{ShipStore, StoreError};
use shipyard_ships::{
    FilterParams, NewShip, PageRequest, Ship, ShipFilter, ShipOrder, ShipPayload, apply_update,
};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Clone)]
pub struct ShipService {
    store: Arc<dyn ShipStore>,
}

impl std::fmt::Debug for ShipService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShipService").finish_non_exhaustive()
    }
}

impl ShipService {
    pub fn new(store: Arc<dyn ShipStore>) -> Self {
        Self { store }
    }

    pub async fn list(
        &self,
        params: &FilterParams,
        order: ShipOrder,
        page: PageRequest,
    ) -> ServiceResult<Vec<Ship>> {
        let filter = ShipFilter::from_params(params);
        Ok(self.store.find(&filter, order, page).await?)
    }

    pub async fn count(&self, params: &FilterParams) -> ServiceResult<u64> {
        let filter = ShipFilter::from_params(params);
        Ok(self.store.count(&filter).await?)
    }

    pub async fn get(&self, id: ShipId) -> ServiceResult<Ship> {
        ensure_not_sentinel(id)?;
        self.store
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found().into())
    }

    pub async fn create(&self, payload: ShipPayload) -> ServiceResult<Ship> {
        let new_ship = NewShip::from_payload(payload).map_err(rejected)?;
        let ship = self.store.insert(new_ship).await?;

        tracing::info!(ship_id = %ship.id, rating = ship.rating, "ship created");
        Ok(ship)
    }

    pub async fn update(&self, id: ShipId, patch: ShipPayload) -> ServiceResult<Ship> {
        let existing = self.get(id).await?;
        let merged = apply_update(&existing, patch).map_err(rejected)?;

        let saved = self
            .store
            .update(&merged, ExpectedVersion::Exact(existing.version()))
            .await?;

        tracing::info!(ship_id = %saved.id, version = saved.version, "ship updated");
        Ok(saved)
    }

    pub async fn delete(&self, id: ShipId) -> ServiceResult<()> {
        ensure_not_sentinel(id)?;
        if !self.store.delete(id).await? {
            return Err(DomainError::not_found().into());
        }

        tracing::info!(ship_id = %id, "ship deleted");
        Ok(())
    }
}

fn ensure_not_sentinel(id: ShipId) -> Result<(), DomainError> {
    if id.is_sentinel() {
        return Err(DomainError::invalid_id("ship id must not be zero"));
    }
    Ok(())
}

fn rejected(err: DomainError) -> ServiceError {
    tracing::debug!(error = %err, "ship rejected");
    err.into()
}
