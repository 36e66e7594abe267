//! Rating formula.
//!
//! `rating = round2(80 * speed * k / (3019 - year + 1))` where `k` is `0.5` for a
//! used ship and `1.0` otherwise. The production year is taken in a fixed UTC+3
//! zone so that instants close to New Year resolve to the same year everywhere.

use chrono::{DateTime, Datelike, FixedOffset, Utc};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

/// "Now", as far as ship ages are concerned.
pub const CURRENT_YEAR: i32 = 3019;

/// Offset of the reference zone (Moscow, no daylight saving).
pub const REFERENCE_OFFSET_SECS: i32 = 3 * 3600;

const USED_COEFFICIENT: f64 = 0.5;
const NEW_COEFFICIENT: f64 = 1.0;

/// Compute the rating of a ship from its speed, usage flag and production date.
pub fn calculate(speed: f64, is_used: bool, prod_date: DateTime<Utc>) -> f64 {
    let k = if is_used { USED_COEFFICIENT } else { NEW_COEFFICIENT };
    let age = f64::from(CURRENT_YEAR - production_year(prod_date) + 1);

    round2(80.0 * speed * k / age)
}

/// Calendar year of `prod_date` in the reference zone.
pub fn production_year(prod_date: DateTime<Utc>) -> i32 {
    match FixedOffset::east_opt(REFERENCE_OFFSET_SECS) {
        Some(zone) => prod_date.with_timezone(&zone).year(),
        None => prod_date.year(),
    }
}

/// Round to two decimal places, ties to even.
///
/// The value is first taken at its shortest decimal representation, so `0.135`
/// rounds as the literal `0.135` and not as its binary expansion.
pub fn round2(value: f64) -> f64 {
    match Decimal::from_scientific(&format!("{value:e}")) {
        Ok(d) => d
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
            .to_f64()
            .unwrap_or(value),
        // Below Decimal's 28-digit scale: rounds to zero.
        Err(_) if value.abs() < 1.0 => 0.0,
        Err(_) => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::prod_date_in_year;
    use chrono::TimeZone;
    use proptest::prelude::*;

    #[test]
    fn new_ship_from_year_3000() {
        assert_eq!(calculate(0.50, false, prod_date_in_year(3000)), 2.00);
    }

    #[test]
    fn used_ship_from_year_3000_is_halved() {
        assert_eq!(calculate(0.50, true, prod_date_in_year(3000)), 1.00);
    }

    #[test]
    fn ship_from_current_year_has_age_one() {
        assert_eq!(calculate(0.99, false, prod_date_in_year(3019)), 79.2);
    }

    #[test]
    fn rating_is_rounded_to_two_places() {
        // 80 * 0.33 / 220 = 0.12
        assert_eq!(calculate(0.33, false, prod_date_in_year(2800)), 0.12);
        // 80 * 0.77 / 7 = 8.8
        assert_eq!(calculate(0.77, false, prod_date_in_year(3013)), 8.8);
    }

    #[test]
    fn round2_breaks_ties_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.135), 0.14);
        assert_eq!(round2(0.005), 0.0);
        assert_eq!(round2(0.015), 0.02);
        assert_eq!(round2(2.0), 2.0);
    }

    #[test]
    fn round2_flushes_tiny_values_to_zero() {
        assert_eq!(round2(1e-40), 0.0);
    }

    #[test]
    fn production_year_uses_utc_plus_three() {
        // 22:00 UTC on New Year's Eve is already 01:00 of the next year in the reference zone.
        let instant = Utc.with_ymd_and_hms(2999, 12, 31, 22, 0, 0).unwrap();
        assert_eq!(production_year(instant), 3000);

        let instant = Utc.with_ymd_and_hms(2999, 12, 31, 20, 59, 59).unwrap();
        assert_eq!(production_year(instant), 2999);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: the rating is the documented formula, rounded, and never negative.
        #[test]
        fn rating_matches_formula(
            speed_hundredths in 1u32..=99u32,
            year in 2800i32..=3019i32,
            is_used in any::<bool>()
        ) {
            let speed = f64::from(speed_hundredths) / 100.0;
            let k = if is_used { 0.5 } else { 1.0 };
            let expected = round2(80.0 * speed * k / f64::from(3019 - year + 1));

            let rating = calculate(speed, is_used, prod_date_in_year(year));
            prop_assert_eq!(rating, expected);
            prop_assert!(rating >= 0.0);
        }

        /// Property: recomputation is deterministic.
        #[test]
        fn rating_is_deterministic(
            speed_hundredths in 1u32..=99u32,
            year in 2800i32..=3019i32,
            is_used in any::<bool>()
        ) {
            let speed = f64::from(speed_hundredths) / 100.0;
            let date = prod_date_in_year(year);
            prop_assert_eq!(calculate(speed, is_used, date), calculate(speed, is_used, date));
        }
    }
}
