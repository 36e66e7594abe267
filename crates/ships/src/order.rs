//! Sort and paging directives, applied by the store after filtering.

use core::cmp::Ordering;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use shipyard_core::{DomainError, DomainResult};

use crate::ship::Ship;

/// Sort key accepted by the `order` query parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShipOrder {
    #[default]
    Id,
    Speed,
    Date,
    Rating,
}

impl ShipOrder {
    /// Column the order maps to in the `ship` table.
    pub fn column(self) -> &'static str {
        match self {
            ShipOrder::Id => "id",
            ShipOrder::Speed => "speed",
            ShipOrder::Date => "prod_date",
            ShipOrder::Rating => "rating",
        }
    }

    /// Ascending comparison on the sort key, ties broken by id.
    pub fn compare(self, a: &Ship, b: &Ship) -> Ordering {
        let primary = match self {
            ShipOrder::Id => Ordering::Equal,
            ShipOrder::Speed => a.speed.total_cmp(&b.speed),
            ShipOrder::Date => a.prod_date.cmp(&b.prod_date),
            ShipOrder::Rating => a.rating.total_cmp(&b.rating),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

impl FromStr for ShipOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ID" => Ok(ShipOrder::Id),
            "SPEED" => Ok(ShipOrder::Speed),
            "DATE" => Ok(ShipOrder::Date),
            "RATING" => Ok(ShipOrder::Rating),
            other => Err(DomainError::validation(format!(
                "unknown order `{other}` (expected one of ID, SPEED, DATE, RATING)"
            ))),
        }
    }
}

/// Zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page_number: u32,
    page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_number: 0,
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub const DEFAULT_PAGE_SIZE: u32 = 3;

    pub fn new(page_number: Option<u32>, page_size: Option<u32>) -> DomainResult<Self> {
        let page_size = page_size.unwrap_or(Self::DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            return Err(DomainError::validation("pageSize must be at least 1"));
        }
        Ok(Self {
            page_number: page_number.unwrap_or(0),
            page_size,
        })
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page_number) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ship;

    #[test]
    fn order_parses_closed_set() {
        assert_eq!("ID".parse::<ShipOrder>().unwrap(), ShipOrder::Id);
        assert_eq!("DATE".parse::<ShipOrder>().unwrap(), ShipOrder::Date);
        assert!(matches!(
            "NAME".parse::<ShipOrder>(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn order_maps_to_columns() {
        assert_eq!(ShipOrder::default().column(), "id");
        assert_eq!(ShipOrder::Date.column(), "prod_date");
    }

    #[test]
    fn compare_breaks_ties_by_id() {
        let a = ship(1);
        let b = ship(2);
        assert_eq!(ShipOrder::Speed.compare(&a, &b), Ordering::Less);

        let mut slow = ship(3);
        slow.speed = 0.1;
        assert_eq!(ShipOrder::Speed.compare(&slow, &a), Ordering::Less);
    }

    #[test]
    fn page_defaults() {
        let page = PageRequest::new(None, None).unwrap();
        assert_eq!(page, PageRequest::default());
        assert_eq!(page.offset(), 0);
        assert_eq!(page.limit(), 3);
    }

    #[test]
    fn page_offset_is_number_times_size() {
        let page = PageRequest::new(Some(4), Some(5)).unwrap();
        assert_eq!(page.offset(), 20);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert!(PageRequest::new(None, Some(0)).is_err());
    }
}
