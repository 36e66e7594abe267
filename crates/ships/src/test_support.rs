//! Shared fixtures for unit tests.

use chrono::{DateTime, TimeZone, Utc};

use shipyard_core::ShipId;

use crate::ship::{NewShip, Ship, ShipPayload, ShipType};

/// Mid-year instant, far from any time-zone-sensitive year boundary.
pub fn prod_date_in_year(year: i32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, 6, 15, 12, 0, 0).unwrap()
}

/// `{name:"Test", planet:"Earth", MERCHANT, year 3000, new, speed 0.50, crew 100}`.
pub fn payload() -> ShipPayload {
    ShipPayload {
        name: Some("Test".to_string()),
        planet: Some("Earth".to_string()),
        ship_type: Some(ShipType::Merchant),
        prod_date: Some(prod_date_in_year(3000)),
        is_used: Some(false),
        speed: Some(0.50),
        crew_size: Some(100),
        ..ShipPayload::default()
    }
}

pub fn ship(id: i64) -> Ship {
    NewShip::from_payload(payload())
        .unwrap()
        .into_ship(ShipId::from_raw(id))
}
