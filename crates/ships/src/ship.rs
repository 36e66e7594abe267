use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shipyard_core::{DomainError, DomainResult, Entity, ShipId};

use crate::{rating, validation};

/// Ship classification (closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShipType {
    Transport,
    Military,
    Merchant,
}

impl ShipType {
    pub const ALL: [ShipType; 3] = [ShipType::Transport, ShipType::Military, ShipType::Merchant];

    /// Stored/wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipType::Transport => "TRANSPORT",
            ShipType::Military => "MILITARY",
            ShipType::Merchant => "MERCHANT",
        }
    }
}

impl core::fmt::Display for ShipType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TRANSPORT" => Ok(ShipType::Transport),
            "MILITARY" => Ok(ShipType::Military),
            "MERCHANT" => Ok(ShipType::Merchant),
            other => Err(DomainError::validation(format!(
                "unknown ship type `{other}` (expected one of TRANSPORT, MILITARY, MERCHANT)"
            ))),
        }
    }
}

/// A persisted ship record.
///
/// `prodDate` travels as epoch milliseconds. `version` is store bookkeeping and
/// never leaves the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ship {
    pub id: ShipId,
    pub name: String,
    pub planet: String,
    pub ship_type: ShipType,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub prod_date: DateTime<Utc>,
    pub is_used: bool,
    pub speed: f64,
    pub crew_size: i32,
    pub rating: f64,
    #[serde(skip)]
    pub version: u64,
}

impl Entity for Ship {
    type Id = ShipId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Incoming ship body, used for both create (full) and update (partial).
///
/// Every field is optional on the wire. `id` and `rating` are accepted so that
/// clients can echo a record back, but they are always ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ship_type: Option<ShipType>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub prod_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_used: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crew_size: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

/// A validated ship that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewShip {
    pub name: String,
    pub planet: String,
    pub ship_type: ShipType,
    pub prod_date: DateTime<Utc>,
    pub is_used: bool,
    pub speed: f64,
    pub crew_size: i32,
    pub rating: f64,
}

impl NewShip {
    /// Validate a create payload, default `isUsed` and compute the rating.
    ///
    /// Unlike updates, a create must carry every field except `isUsed`.
    pub fn from_payload(payload: ShipPayload) -> DomainResult<Self> {
        validation::validate(&validation::Candidate::from(&payload))?;

        let ShipPayload {
            id: _,
            name,
            planet,
            ship_type,
            prod_date,
            is_used,
            speed,
            crew_size,
            rating: _,
        } = payload;

        let name = required(name, "name")?;
        let planet = required(planet, "planet")?;
        let ship_type = required(ship_type, "shipType")?;
        let prod_date = required(prod_date, "prodDate")?;
        let speed = required(speed, "speed")?;
        let crew_size = required(crew_size, "crewSize")?;
        let is_used = is_used.unwrap_or(false);

        Ok(Self {
            rating: rating::calculate(speed, is_used, prod_date),
            name,
            planet,
            ship_type,
            prod_date,
            is_used,
            speed,
            crew_size,
        })
    }

    /// Attach a store-assigned id.
    pub fn into_ship(self, id: ShipId) -> Ship {
        Ship {
            id,
            name: self.name,
            planet: self.planet,
            ship_type: self.ship_type,
            prod_date: self.prod_date,
            is_used: self.is_used,
            speed: self.speed,
            crew_size: self.crew_size,
            rating: self.rating,
            version: 0,
        }
    }
}

fn required<T>(value: Option<T>, field: &str) -> DomainResult<T> {
    value.ok_or_else(|| DomainError::validation(format!("{field} is required")))
}
