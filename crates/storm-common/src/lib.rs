//! Common types shared across the NHC archive crates.
//!
//! Holds the caller-facing inputs (storm selections and category codes) and
//! the geometry-bearing table that every download operation returns.

pub mod error;
pub mod geojson;
pub mod geometry;
pub mod selection;
pub mod table;

pub use error::{StormError, StormResult};
pub use geojson::{Feature, FeatureCollection};
pub use geometry::Geometry;
pub use selection::{CategoryCode, CategoryCodeMap, StormSelection};
pub use table::{FieldValue, TrackRecord, TrackTable, CATCODE_COLUMN, TIMESTAMP_COLUMN};
