//! Field-level validation applied before any write.
//!
//! Every check treats an absent field as valid: the same rules run against
//! partial update bodies (before the merge) and against complete records.

use chrono::{DateTime, Utc};

use shipyard_core::{DomainError, DomainResult};

use crate::rating::{self, round2};
use crate::ship::{Ship, ShipPayload};

pub const TEXT_MAX_LEN: usize = 50;
pub const CREW_SIZE_MIN: i32 = 1;
pub const CREW_SIZE_MAX: i32 = 9999;
pub const SPEED_MIN: f64 = 0.01;
pub const SPEED_MAX: f64 = 0.99;
pub const PROD_YEAR_MIN: i32 = 2800;
pub const PROD_YEAR_MAX: i32 = rating::CURRENT_YEAR;

/// Borrowed view of the validated fields.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Candidate<'a> {
    pub name: Option<&'a str>,
    pub planet: Option<&'a str>,
    pub crew_size: Option<i32>,
    pub speed: Option<f64>,
    pub prod_date: Option<DateTime<Utc>>,
}

impl<'a> From<&'a ShipPayload> for Candidate<'a> {
    fn from(p: &'a ShipPayload) -> Self {
        Self {
            name: p.name.as_deref(),
            planet: p.planet.as_deref(),
            crew_size: p.crew_size,
            speed: p.speed,
            prod_date: p.prod_date,
        }
    }
}

impl<'a> From<&'a Ship> for Candidate<'a> {
    fn from(s: &'a Ship) -> Self {
        Self {
            name: Some(s.name.as_str()),
            planet: Some(s.planet.as_str()),
            crew_size: Some(s.crew_size),
            speed: Some(s.speed),
            prod_date: Some(s.prod_date),
        }
    }
}

/// `true` if any of the five checks rejects the candidate.
pub fn is_not_valid(c: &Candidate<'_>) -> bool {
    name_not_valid(c.name)
        || planet_not_valid(c.planet)
        || crew_size_not_valid(c.crew_size)
        || speed_not_valid(c.speed)
        || prod_date_not_valid(c.prod_date)
}

/// Same decision as [`is_not_valid`], reporting the first failing check.
pub fn validate(c: &Candidate<'_>) -> DomainResult<()> {
    if name_not_valid(c.name) {
        return Err(DomainError::validation(format!(
            "name must be 1..={TEXT_MAX_LEN} characters"
        )));
    }
    if planet_not_valid(c.planet) {
        return Err(DomainError::validation(format!(
            "planet must be 1..={TEXT_MAX_LEN} characters"
        )));
    }
    if crew_size_not_valid(c.crew_size) {
        return Err(DomainError::validation(format!(
            "crewSize must be within {CREW_SIZE_MIN}..={CREW_SIZE_MAX}"
        )));
    }
    if speed_not_valid(c.speed) {
        return Err(DomainError::validation(format!(
            "speed must round to {SPEED_MIN}..={SPEED_MAX}"
        )));
    }
    if prod_date_not_valid(c.prod_date) {
        return Err(DomainError::validation(format!(
            "prodDate year must be within {PROD_YEAR_MIN}..={PROD_YEAR_MAX}"
        )));
    }
    Ok(())
}

fn text_len_not_valid(value: Option<&str>) -> bool {
    value.is_some_and(|v| {
        let len = v.chars().count();
        len < 1 || len > TEXT_MAX_LEN
    })
}

pub fn name_not_valid(name: Option<&str>) -> bool {
    text_len_not_valid(name)
}

pub fn planet_not_valid(planet: Option<&str>) -> bool {
    text_len_not_valid(planet)
}

pub fn crew_size_not_valid(crew_size: Option<i32>) -> bool {
    crew_size.is_some_and(|c| !(CREW_SIZE_MIN..=CREW_SIZE_MAX).contains(&c))
}

pub fn speed_not_valid(speed: Option<f64>) -> bool {
    speed.is_some_and(|s| {
        let rounded = round2(s);
        !(SPEED_MIN..=SPEED_MAX).contains(&rounded)
    })
}

/// Rejects `(timestamp < 0 && year < 2800) || year > 3019`.
///
/// A non-negative timestamp whose year falls below 2800 is accepted; the low
/// bound only bites together with a negative timestamp.
pub fn prod_date_not_valid(prod_date: Option<DateTime<Utc>>) -> bool {
    prod_date.is_some_and(|d| {
        let year = rating::production_year(d);
        (d.timestamp_millis() < 0 && year < PROD_YEAR_MIN) || year > PROD_YEAR_MAX
    })
}
