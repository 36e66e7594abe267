//! Ship record store boundary.
//!
//! The service layer talks to an async [`ShipStore`]; filters, sort order and
//! paging arrive as domain values and each backend decides how to execute them.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryShipStore;
pub use postgres::PostgresShipStore;
pub use r#trait::{ShipStore, StoreError};
