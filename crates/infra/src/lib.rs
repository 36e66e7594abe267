//! Infrastructure layer: ship storage and process configuration.

pub mod config;
pub mod store;
