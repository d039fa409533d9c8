//! Common types and utilities shared across the catalog ingestion crates.

pub mod coords;
pub mod error;
pub mod record;
pub mod sentinel;
pub mod visibility;

pub use coords::{deg_to_rad, deg_to_sexagesimal, rad_to_deg, sexagesimal_to_deg, Axis};
pub use error::{CatalogError, CatalogResult};
pub use record::{CatalogId, ProperMotion, Scalar, ScalarType, StarRecord};
pub use sentinel::{normalize, RawValue, Sentinel};
pub use visibility::{route, Partition, NOT_VISIBLE_DEC_LIMIT};
