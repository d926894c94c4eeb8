//! ESRI shapefile decoder.
//!
//! Decodes the component files of one shapefile dataset held in memory:
//!
//! - `.shp`: geometries (big-endian record headers, little-endian content)
//! - `.shx`: record offsets into the `.shp`
//! - `.dbf`: dBase III attribute table
//! - `.prj`: projection WKT, passed through as text
//!
//! Geometries come out as [`storm_common::Geometry`] and attribute rows as
//! [`storm_common::FieldValue`] lists, ready to be joined into
//! [`storm_common::TrackRecord`]s.

pub mod dbf;
pub mod error;
mod read;
pub mod reader;
pub mod shp;
pub mod shx;

pub use dbf::{DbfHeader, FieldDescriptor, FieldType};
pub use error::{ShapefileError, ShapefileResult};
pub use reader::{read_projection, ShapefileReader};
pub use shp::{ShapeType, ShpHeader};
pub use shx::IndexEntry;
