//! Query filter builder.
//!
//! Each optional query parameter group maps to at most one [`Predicate`] through
//! its own builder function; [`ShipFilter::all_of`] is the conjunction step. A
//! group whose parameters are all absent contributes nothing, so an empty filter
//! matches every ship.
//!
//! The filter is plain data: stores decide how to execute it (in memory through
//! [`ShipFilter::matches`], or by translating predicates to SQL).

use chrono::{DateTime, Utc};

use crate::ship::{Ship, ShipType};

/// Inclusive range with optional bounds. At least one bound is set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeFilter<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T: PartialOrd + Copy> RangeFilter<T> {
    /// `None` when both bounds are absent (no constraint).
    pub fn new(min: Option<T>, max: Option<T>) -> Option<Self> {
        if min.is_none() && max.is_none() {
            return None;
        }
        Some(Self { min, max })
    }

    pub fn contains(&self, value: T) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// A single constraint over one ship field.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Case-sensitive substring match on `name`.
    NameContains(String),
    /// Case-sensitive substring match on `planet`.
    PlanetContains(String),
    ShipTypeIs(ShipType),
    ProdDateWithin(RangeFilter<DateTime<Utc>>),
    IsUsed(bool),
    SpeedWithin(RangeFilter<f64>),
    CrewSizeWithin(RangeFilter<i32>),
    RatingWithin(RangeFilter<f64>),
}

impl Predicate {
    pub fn matches(&self, ship: &Ship) -> bool {
        match self {
            Predicate::NameContains(needle) => ship.name.contains(needle.as_str()),
            Predicate::PlanetContains(needle) => ship.planet.contains(needle.as_str()),
            Predicate::ShipTypeIs(t) => ship.ship_type == *t,
            Predicate::ProdDateWithin(range) => range.contains(ship.prod_date),
            Predicate::IsUsed(used) => ship.is_used == *used,
            Predicate::SpeedWithin(range) => range.contains(ship.speed),
            Predicate::CrewSizeWithin(range) => range.contains(ship.crew_size),
            Predicate::RatingWithin(range) => range.contains(ship.rating),
        }
    }
}

pub fn by_name(name: Option<&str>) -> Option<Predicate> {
    name.map(|n| Predicate::NameContains(n.to_string()))
}

pub fn by_planet(planet: Option<&str>) -> Option<Predicate> {
    planet.map(|p| Predicate::PlanetContains(p.to_string()))
}

pub fn by_ship_type(ship_type: Option<ShipType>) -> Option<Predicate> {
    ship_type.map(Predicate::ShipTypeIs)
}

pub fn by_prod_date(
    after: Option<DateTime<Utc>>,
    before: Option<DateTime<Utc>>,
) -> Option<Predicate> {
    RangeFilter::new(after, before).map(Predicate::ProdDateWithin)
}

pub fn by_is_used(is_used: Option<bool>) -> Option<Predicate> {
    is_used.map(Predicate::IsUsed)
}

pub fn by_speed(min: Option<f64>, max: Option<f64>) -> Option<Predicate> {
    RangeFilter::new(min, max).map(Predicate::SpeedWithin)
}

pub fn by_crew_size(min: Option<i32>, max: Option<i32>) -> Option<Predicate> {
    RangeFilter::new(min, max).map(Predicate::CrewSizeWithin)
}

pub fn by_rating(min: Option<f64>, max: Option<f64>) -> Option<Predicate> {
    RangeFilter::new(min, max).map(Predicate::RatingWithin)
}

/// The optional filter parameters accepted by list and count queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterParams {
    pub name: Option<String>,
    pub planet: Option<String>,
    pub ship_type: Option<ShipType>,
    pub after: Option<DateTime<Utc>>,
    pub before: Option<DateTime<Utc>>,
    pub is_used: Option<bool>,
    pub min_speed: Option<f64>,
    pub max_speed: Option<f64>,
    pub min_crew_size: Option<i32>,
    pub max_crew_size: Option<i32>,
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
}

/// Conjunction of predicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShipFilter {
    predicates: Vec<Predicate>,
}

impl ShipFilter {
    /// Filter that matches every ship.
    pub fn all() -> Self {
        Self::default()
    }

    /// AND together the active predicates; `None` entries are skipped.
    pub fn all_of(predicates: impl IntoIterator<Item = Option<Predicate>>) -> Self {
        Self {
            predicates: predicates.into_iter().flatten().collect(),
        }
    }

    pub fn from_params(params: &FilterParams) -> Self {
        Self::all_of([
            by_name(params.name.as_deref()),
            by_planet(params.planet.as_deref()),
            by_ship_type(params.ship_type),
            by_prod_date(params.after, params.before),
            by_is_used(params.is_used),
            by_speed(params.min_speed, params.max_speed),
            by_crew_size(params.min_crew_size, params.max_crew_size),
            by_rating(params.min_rating, params.max_rating),
        ])
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_unfiltered(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, ship: &Ship) -> bool {
        self.predicates.iter().all(|p| p.matches(ship))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{prod_date_in_year, ship};

    fn fleet() -> Vec<Ship> {
        let mut a = ship(1);
        a.name = "Orion Freighter".to_string();
        a.planet = "Mars".to_string();
        a.speed = 0.3;
        a.crew_size = 10;
        a.rating = 1.2;

        let mut b = ship(2);
        b.name = "Nebula".to_string();
        b.planet = "Earth".to_string();
        b.ship_type = ShipType::Military;
        b.speed = 0.5;
        b.is_used = true;
        b.prod_date = prod_date_in_year(2900);
        b.crew_size = 500;
        b.rating = 0.17;

        let mut c = ship(3);
        c.name = "orion scout".to_string();
        c.planet = "Earth-2".to_string();
        c.ship_type = ShipType::Transport;
        c.speed = 0.9;
        c.prod_date = prod_date_in_year(3015);
        c.crew_size = 9999;
        c.rating = 14.4;

        vec![a, b, c]
    }

    fn ids(filter: &ShipFilter) -> Vec<i64> {
        fleet()
            .into_iter()
            .filter(|s| filter.matches(s))
            .map(|s| s.id.get())
            .collect()
    }

    #[test]
    fn builders_skip_absent_parameters() {
        assert!(by_name(None).is_none());
        assert!(by_planet(None).is_none());
        assert!(by_ship_type(None).is_none());
        assert!(by_prod_date(None, None).is_none());
        assert!(by_is_used(None).is_none());
        assert!(by_speed(None, None).is_none());
        assert!(by_crew_size(None, None).is_none());
        assert!(by_rating(None, None).is_none());
    }

    #[test]
    fn no_parameters_match_everything() {
        let filter = ShipFilter::from_params(&FilterParams::default());
        assert!(filter.is_unfiltered());
        assert_eq!(ids(&filter), vec![1, 2, 3]);
    }

    #[test]
    fn name_match_is_case_sensitive_substring() {
        let filter = ShipFilter::all_of([by_name(Some("Orion"))]);
        assert_eq!(ids(&filter), vec![1]);
    }

    #[test]
    fn planet_match_is_substring() {
        let filter = ShipFilter::all_of([by_planet(Some("Earth"))]);
        assert_eq!(ids(&filter), vec![2, 3]);
    }

    #[test]
    fn min_speed_alone_is_a_lower_bound() {
        let filter = ShipFilter::from_params(&FilterParams {
            min_speed: Some(0.5),
            ..FilterParams::default()
        });
        assert_eq!(ids(&filter), vec![2, 3]);
    }

    #[test]
    fn max_crew_alone_is_an_upper_bound() {
        let filter = ShipFilter::all_of([by_crew_size(None, Some(500))]);
        assert_eq!(ids(&filter), vec![1, 2]);
    }

    #[test]
    fn two_sided_ranges_are_inclusive() {
        let filter = ShipFilter::all_of([by_rating(Some(0.17), Some(1.2))]);
        assert_eq!(ids(&filter), vec![1, 2]);
    }

    #[test]
    fn inverted_date_range_matches_nothing() {
        let filter = ShipFilter::all_of([by_prod_date(
            Some(prod_date_in_year(3010)),
            Some(prod_date_in_year(2950)),
        )]);
        assert!(ids(&filter).is_empty());
    }

    #[test]
    fn date_range_is_inclusive_on_both_ends() {
        let filter = ShipFilter::all_of([by_prod_date(
            Some(prod_date_in_year(2900)),
            Some(prod_date_in_year(3000)),
        )]);
        assert_eq!(ids(&filter), vec![1, 2]);
    }

    #[test]
    fn groups_are_combined_with_and() {
        let filter = ShipFilter::from_params(&FilterParams {
            planet: Some("Earth".to_string()),
            is_used: Some(false),
            ship_type: Some(ShipType::Transport),
            ..FilterParams::default()
        });
        assert_eq!(filter.predicates().len(), 3);
        assert_eq!(ids(&filter), vec![3]);
    }

    #[test]
    fn range_filter_requires_a_bound() {
        assert!(RangeFilter::<i32>::new(None, None).is_none());
        let r = RangeFilter::new(Some(1), None).unwrap();
        assert!(r.contains(1));
        assert!(!r.contains(0));
    }
}
