use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use shipyard_core::{Entity, ExpectedVersion, ShipId};
use shipyard_ships::{NewShip, PageRequest, Ship, ShipFilter, ShipOrder};

use super::r#trait::{ShipStore, StoreError};

#[derive(Debug)]
struct Table {
    next_id: i64,
    rows: BTreeMap<ShipId, Ship>,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

/// In-memory ship table.
///
/// Intended for tests/dev. Ids start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct InMemoryShipStore {
    table: RwLock<Table>,
}

impl InMemoryShipStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Table>, StoreError> {
        self.table
            .read()
            .map_err(|_| StoreError::Storage("ship table lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Table>, StoreError> {
        self.table
            .write()
            .map_err(|_| StoreError::Storage("ship table lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl ShipStore for InMemoryShipStore {
    async fn insert(&self, ship: NewShip) -> Result<Ship, StoreError> {
        let mut table = self.write()?;
        let id = ShipId::from_raw(table.next_id);
        table.next_id += 1;

        let ship = ship.into_ship(id);
        table.rows.insert(id, ship.clone());
        Ok(ship)
    }

    async fn get(&self, id: ShipId) -> Result<Option<Ship>, StoreError> {
        Ok(self.read()?.rows.get(&id).cloned())
    }

    async fn find(
        &self,
        filter: &ShipFilter,
        order: ShipOrder,
        page: PageRequest,
    ) -> Result<Vec<Ship>, StoreError> {
        let mut matching: Vec<Ship> = self
            .read()?
            .rows
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| order.compare(a, b));

        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        Ok(matching.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, filter: &ShipFilter) -> Result<u64, StoreError> {
        let n = self.read()?.rows.values().filter(|s| filter.matches(s)).count();
        Ok(n as u64)
    }

    async fn update(&self, ship: &Ship, expected: ExpectedVersion) -> Result<Ship, StoreError> {
        let mut table = self.write()?;
        let stored = table
            .rows
            .get_mut(&ship.id)
            .ok_or(StoreError::NotFound(ship.id))?;

        expected
            .check(stored.version())
            .map_err(|e| StoreError::Conflict(e.to_string()))?;

        let mut updated = ship.clone();
        updated.version = stored.version() + 1;
        *stored = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: ShipId) -> Result<bool, StoreError> {
        Ok(self.write()?.rows.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use shipyard_ships::{ShipPayload, ShipType, filter};

    fn new_ship(name: &str, speed: f64) -> NewShip {
        NewShip::from_payload(ShipPayload {
            name: Some(name.to_string()),
            planet: Some("Earth".to_string()),
            ship_type: Some(ShipType::Transport),
            prod_date: Some(Utc.with_ymd_and_hms(3000, 6, 15, 12, 0, 0).unwrap()),
            speed: Some(speed),
            crew_size: Some(10),
            ..ShipPayload::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids_from_one() {
        let store = InMemoryShipStore::new();
        let a = store.insert(new_ship("a", 0.1)).await.unwrap();
        let b = store.insert(new_ship("b", 0.2)).await.unwrap();

        assert_eq!(a.id, ShipId::from_raw(1));
        assert_eq!(b.id, ShipId::from_raw(2));
        assert_eq!(store.get(a.id).await.unwrap(), Some(a));
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = InMemoryShipStore::new();
        let a = store.insert(new_ship("a", 0.1)).await.unwrap();
        assert!(store.delete(a.id).await.unwrap());
        assert!(!store.delete(a.id).await.unwrap());

        let b = store.insert(new_ship("b", 0.2)).await.unwrap();
        assert_eq!(b.id, ShipId::from_raw(2));
    }

    #[tokio::test]
    async fn find_sorts_and_pages() {
        let store = InMemoryShipStore::new();
        for (name, speed) in [("a", 0.9), ("b", 0.1), ("c", 0.5), ("d", 0.3)] {
            store.insert(new_ship(name, speed)).await.unwrap();
        }

        let first = store
            .find(&ShipFilter::all(), ShipOrder::Speed, PageRequest::default())
            .await
            .unwrap();
        let names: Vec<_> = first.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["b", "d", "c"]);

        let second = store
            .find(
                &ShipFilter::all(),
                ShipOrder::Speed,
                PageRequest::new(Some(1), None).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].name, "a");
    }

    #[tokio::test]
    async fn count_ignores_paging() {
        let store = InMemoryShipStore::new();
        for i in 0..5 {
            store.insert(new_ship(&format!("s{i}"), 0.5)).await.unwrap();
        }
        store.insert(new_ship("slow", 0.1)).await.unwrap();

        let fast = ShipFilter::all_of([filter::by_speed(Some(0.5), None)]);
        assert_eq!(store.count(&fast).await.unwrap(), 5);
        assert_eq!(store.count(&ShipFilter::all()).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn update_bumps_version_and_rejects_stale_writes() {
        let store = InMemoryShipStore::new();
        let original = store.insert(new_ship("a", 0.1)).await.unwrap();

        let mut renamed = original.clone();
        renamed.name = "renamed".to_string();
        let updated = store
            .update(&renamed, ExpectedVersion::Exact(original.version))
            .await
            .unwrap();
        assert_eq!(updated.version, 1);

        let err = store
            .update(&renamed, ExpectedVersion::Exact(original.version))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.get(original.id).await.unwrap().unwrap().name, "renamed");
    }

    #[tokio::test]
    async fn update_of_missing_row_is_not_found() {
        let store = InMemoryShipStore::new();
        let ghost = new_ship("ghost", 0.1).into_ship(ShipId::from_raw(42));
        let err = store.update(&ghost, ExpectedVersion::Any).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound(ShipId::from_raw(42)));
    }
}
