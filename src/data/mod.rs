//! Data module - CSV loading, canonical schema and value coercion

pub mod coerce;
mod loader;
pub mod schema;

pub use loader::{DataLoader, LoaderError};
pub use schema::{ColumnKind, PlayerColumn};
