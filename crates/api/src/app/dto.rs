use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, de};

use shipyard_core::{DomainError, DomainResult};
use shipyard_ships::{FilterParams, PageRequest, ShipOrder, ShipType};

// -------------------------
// Query DTOs
// -------------------------

/// Query string accepted by `GET /rest/ships` and `GET /rest/ships/count`.
///
/// `after`/`before` are epoch milliseconds. `order`, `pageNumber` and
/// `pageSize` only affect the list endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipQuery {
    pub name: Option<String>,
    pub planet: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub ship_type: Option<ShipType>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub after: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub before: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub is_used: Option<bool>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub min_speed: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub max_speed: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub min_crew_size: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub max_crew_size: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub min_rating: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub max_rating: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub order: Option<ShipOrder>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page_number: Option<u32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page_size: Option<u32>,
}

/// A typed query parameter sent with an empty value (`?minSpeed=`) is unset.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.is_empty() => raw.parse().map(Some).map_err(de::Error::custom),
        _ => Ok(None),
    }
}

impl ShipQuery {
    pub fn filter_params(&self) -> DomainResult<FilterParams> {
        Ok(FilterParams {
            name: self.name.clone(),
            planet: self.planet.clone(),
            ship_type: self.ship_type,
            after: from_millis("after", self.after)?,
            before: from_millis("before", self.before)?,
            is_used: self.is_used,
            min_speed: self.min_speed,
            max_speed: self.max_speed,
            min_crew_size: self.min_crew_size,
            max_crew_size: self.max_crew_size,
            min_rating: self.min_rating,
            max_rating: self.max_rating,
        })
    }

    pub fn order(&self) -> ShipOrder {
        self.order.unwrap_or_default()
    }

    pub fn page(&self) -> DomainResult<PageRequest> {
        PageRequest::new(self.page_number, self.page_size)
    }
}

fn from_millis(field: &str, millis: Option<i64>) -> DomainResult<Option<DateTime<Utc>>> {
    millis
        .map(|ms| {
            DateTime::from_timestamp_millis(ms)
                .ok_or_else(|| DomainError::validation(format!("{field} is out of range")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::Uri;

    fn parse(uri: &str) -> Result<ShipQuery, String> {
        let uri: Uri = uri.parse().unwrap();
        Query::<ShipQuery>::try_from_uri(&uri)
            .map(|Query(q)| q)
            .map_err(|e| e.to_string())
    }

    #[test]
    fn empty_query_uses_defaults() {
        let q = parse("/rest/ships").unwrap();
        assert_eq!(q.filter_params().unwrap(), FilterParams::default());
        assert_eq!(q.order(), ShipOrder::Id);
        assert_eq!(q.page().unwrap(), PageRequest::default());
    }

    #[test]
    fn camel_case_parameters_are_read() {
        let q = parse(
            "/rest/ships?shipType=MILITARY&isUsed=true&minSpeed=0.5&maxCrewSize=10&after=0&order=RATING&pageNumber=2&pageSize=5",
        )
        .unwrap();
        let params = q.filter_params().unwrap();

        assert_eq!(params.ship_type, Some(ShipType::Military));
        assert_eq!(params.is_used, Some(true));
        assert_eq!(params.min_speed, Some(0.5));
        assert_eq!(params.max_crew_size, Some(10));
        assert_eq!(params.after, DateTime::from_timestamp_millis(0));
        assert_eq!(q.order(), ShipOrder::Rating);
        assert_eq!(q.page().unwrap().offset(), 10);
    }

    #[test]
    fn unknown_enum_values_fail_to_parse() {
        assert!(parse("/rest/ships?order=NAME").is_err());
        assert!(parse("/rest/ships?shipType=yacht").is_err());
        assert!(parse("/rest/ships?minSpeed=fast").is_err());
    }

    #[test]
    fn empty_typed_parameters_are_unset() {
        let q = parse(
            "/rest/ships?minSpeed=&isUsed=&minCrewSize=&after=&shipType=&order=&pageSize=",
        )
        .unwrap();

        assert_eq!(q.filter_params().unwrap(), FilterParams::default());
        assert_eq!(q.order(), ShipOrder::Id);
        assert_eq!(q.page().unwrap(), PageRequest::default());
    }

    #[test]
    fn out_of_range_millis_is_a_validation_error() {
        let q = ShipQuery {
            before: Some(i64::MAX),
            ..ShipQuery::default()
        };
        assert!(matches!(
            q.filter_params(),
            Err(DomainError::Validation(_))
        ));
    }
}
