//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a ship record, assigned by the store.
///
/// Zero is reserved as the "invalid identifier" sentinel: it is never assigned
/// and requests carrying it are rejected before any lookup.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShipId(i64);

impl ShipId {
    pub const SENTINEL: ShipId = ShipId(0);

    /// Wrap a raw identifier without checking it.
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Wrap a raw identifier coming from a caller, rejecting the zero sentinel.
    pub fn checked(raw: i64) -> Result<Self, DomainError> {
        if raw == 0 {
            return Err(DomainError::invalid_id("ship id must not be zero"));
        }
        Ok(Self(raw))
    }

    pub const fn get(self) -> i64 {
        self.0
    }

    pub const fn is_sentinel(self) -> bool {
        self.0 == 0
    }
}

impl core::fmt::Display for ShipId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<ShipId> for i64 {
    fn from(value: ShipId) -> Self {
        value.0
    }
}

impl FromStr for ShipId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .parse::<i64>()
            .map_err(|e| DomainError::invalid_id(format!("ShipId: {e}")))?;
        Self::checked(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_rejected_as_sentinel() {
        let err = ShipId::checked(0).unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(_)));
        assert!(ShipId::SENTINEL.is_sentinel());
    }

    #[test]
    fn negative_ids_are_not_the_sentinel() {
        let id = ShipId::checked(-4).unwrap();
        assert_eq!(id.get(), -4);
    }

    #[test]
    fn parses_from_path_segment() {
        assert_eq!("17".parse::<ShipId>().unwrap(), ShipId::from_raw(17));
        assert!("abc".parse::<ShipId>().is_err());
        assert!("0".parse::<ShipId>().is_err());
    }
}
