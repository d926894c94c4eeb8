//! Vector geometries decoded from shapefile records.
//!
//! Coordinates are `[x, y]`, i.e. `[longitude, latitude]` for the NHC
//! archives. Z and M ordinates are not carried.

use serde::{Deserialize, Serialize};

/// A geometry in GeoJSON layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Geometry {
    /// Shapefile null shape. Serialized as a GeoJSON `null` geometry by the
    /// feature writer, never through this tag.
    Null,

    Point {
        coordinates: [f64; 2],
    },

    MultiPoint {
        coordinates: Vec<[f64; 2]>,
    },

    LineString {
        coordinates: Vec<[f64; 2]>,
    },

    MultiLineString {
        coordinates: Vec<Vec<[f64; 2]>>,
    },

    /// Exterior ring first, holes after.
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },

    MultiPolygon {
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
}

impl Geometry {
    pub fn point(x: f64, y: f64) -> Self {
        Geometry::Point {
            coordinates: [x, y],
        }
    }

    /// Build a line geometry from polyline parts.
    ///
    /// One part becomes a `LineString`, several a `MultiLineString`.
    pub fn from_parts(mut parts: Vec<Vec<[f64; 2]>>) -> Self {
        match parts.len() {
            0 => Geometry::Null,
            1 => Geometry::LineString {
                coordinates: parts.remove(0),
            },
            _ => Geometry::MultiLineString { coordinates: parts },
        }
    }

    /// Build a polygon geometry from shapefile rings.
    ///
    /// Shapefile exterior rings are clockwise and holes counter-clockwise.
    /// Each clockwise ring opens a new polygon; counter-clockwise rings are
    /// attached to the polygon opened before them. A leading hole with no
    /// exterior is promoted to an exterior.
    pub fn from_rings(rings: Vec<Vec<[f64; 2]>>) -> Self {
        let mut polygons: Vec<Vec<Vec<[f64; 2]>>> = Vec::new();

        for ring in rings {
            match polygons.last_mut() {
                Some(polygon) if !is_clockwise(&ring) => polygon.push(ring),
                _ => polygons.push(vec![ring]),
            }
        }

        match polygons.len() {
            0 => Geometry::Null,
            1 => Geometry::Polygon {
                coordinates: polygons.remove(0),
            },
            _ => Geometry::MultiPolygon {
                coordinates: polygons,
            },
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Geometry::Null)
    }

    /// GeoJSON type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Null => "Null",
            Geometry::Point { .. } => "Point",
            Geometry::MultiPoint { .. } => "MultiPoint",
            Geometry::LineString { .. } => "LineString",
            Geometry::MultiLineString { .. } => "MultiLineString",
            Geometry::Polygon { .. } => "Polygon",
            Geometry::MultiPolygon { .. } => "MultiPolygon",
        }
    }
}

/// Shoelace test; negative signed area means clockwise in a y-up frame.
fn is_clockwise(ring: &[[f64; 2]]) -> bool {
    let area: f64 = ring
        .windows(2)
        .map(|w| (w[1][0] - w[0][0]) * (w[1][1] + w[0][1]))
        .sum();
    area > 0.0
}
