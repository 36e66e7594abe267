//! Ships domain module.
//!
//! This crate contains the business rules for ship records, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage): field validation, the
//! rating formula, the partial-update merge and the query filter builder.

pub mod filter;
pub mod merge;
pub mod order;
pub mod rating;
pub mod ship;
pub mod validation;

pub use filter::{FilterParams, Predicate, RangeFilter, ShipFilter};
pub use merge::{apply_update, merge_update};
pub use order::{PageRequest, ShipOrder};
pub use ship::{NewShip, Ship, ShipPayload, ShipType};

#[cfg(test)]
mod test_support;
