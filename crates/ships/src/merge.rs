//! Partial-update merge.

use shipyard_core::DomainResult;

use crate::rating;
use crate::ship::{Ship, ShipPayload};
use crate::validation::{self, Candidate};

/// Overlay the fields present in `patch` onto `existing`.
///
/// `id` and `version` always come from `existing`; any incoming `id` or `rating`
/// is dropped and the rating is recomputed from the merged speed, usage flag and
/// production date.
pub fn merge_update(existing: &Ship, patch: ShipPayload) -> Ship {
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
    } = patch;

    let speed = speed.unwrap_or(existing.speed);
    let is_used = is_used.unwrap_or(existing.is_used);
    let prod_date = prod_date.unwrap_or(existing.prod_date);

    Ship {
        id: existing.id,
        name: name.unwrap_or_else(|| existing.name.clone()),
        planet: planet.unwrap_or_else(|| existing.planet.clone()),
        ship_type: ship_type.unwrap_or(existing.ship_type),
        prod_date,
        is_used,
        speed,
        crew_size: crew_size.unwrap_or(existing.crew_size),
        rating: rating::calculate(speed, is_used, prod_date),
        version: existing.version,
    }
}

/// Validate `patch`, merge it onto `existing` and validate the result.
///
/// On error nothing has been merged and the caller must not persist anything.
pub fn apply_update(existing: &Ship, patch: ShipPayload) -> DomainResult<Ship> {
    validation::validate(&Candidate::from(&patch))?;
    let merged = merge_update(existing, patch);
    validation::validate(&Candidate::from(&merged))?;
    Ok(merged)
}
