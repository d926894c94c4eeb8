//! `.shp` main file parsing.
//!
//! Layout per the ESRI Shapefile Technical Description (1998):
//!
//! ```text
//! Header (100 bytes)
//!   0..4    file code 9994        big-endian
//!   24..28  file length (words)   big-endian
//!   28..32  version 1000          little-endian
//!   32..36  shape type            little-endian
//!   36..68  Xmin Ymin Xmax Ymax   little-endian f64
//! Record
//!   0..4    record number         big-endian
//!   4..8    content length (words) big-endian
//!   8..     content               little-endian
//! ```

use storm_common::Geometry;

use crate::error::{ShapefileError, ShapefileResult};
use crate::read;

pub const FILE_CODE: i32 = 9994;
pub const VERSION: i32 = 1000;
pub const HEADER_LEN: usize = 100;
pub const RECORD_HEADER_LEN: usize = 8;

/// Shape types defined by the format. Z and M variants carry extra
/// ordinates after the x/y data, which are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeType {
    Null,
    Point,
    PolyLine,
    Polygon,
    MultiPoint,
    PointZ,
    PolyLineZ,
    PolygonZ,
    MultiPointZ,
    PointM,
    PolyLineM,
    PolygonM,
    MultiPointM,
}

impl ShapeType {
    pub fn from_code(code: i32) -> ShapefileResult<Self> {
        Ok(match code {
            0 => ShapeType::Null,
            1 => ShapeType::Point,
            3 => ShapeType::PolyLine,
            5 => ShapeType::Polygon,
            8 => ShapeType::MultiPoint,
            11 => ShapeType::PointZ,
            13 => ShapeType::PolyLineZ,
            15 => ShapeType::PolygonZ,
            18 => ShapeType::MultiPointZ,
            21 => ShapeType::PointM,
            23 => ShapeType::PolyLineM,
            25 => ShapeType::PolygonM,
            28 => ShapeType::MultiPointM,
            other => return Err(ShapefileError::UnsupportedShapeType(other)),
        })
    }

    pub fn code(&self) -> i32 {
        match self {
            ShapeType::Null => 0,
            ShapeType::Point => 1,
            ShapeType::PolyLine => 3,
            ShapeType::Polygon => 5,
            ShapeType::MultiPoint => 8,
            ShapeType::PointZ => 11,
            ShapeType::PolyLineZ => 13,
            ShapeType::PolygonZ => 15,
            ShapeType::MultiPointZ => 18,
            ShapeType::PointM => 21,
            ShapeType::PolyLineM => 23,
            ShapeType::PolygonM => 25,
            ShapeType::MultiPointM => 28,
        }
    }
}

/// Main file header. The `.shx` header has the same layout.
#[derive(Debug, Clone)]
pub struct ShpHeader {
    pub file_length: usize,
    pub shape_type: ShapeType,
    /// Xmin, Ymin, Xmax, Ymax
    pub bbox: [f64; 4],
}

pub fn parse_header(data: &[u8], file: &'static str) -> ShapefileResult<ShpHeader> {
    if data.len() < HEADER_LEN {
        return Err(ShapefileError::InvalidHeader {
            file,
            reason: format!("{} bytes is shorter than the 100 byte header", data.len()),
        });
    }

    let code = read::i32_be(data, 0, file)?;
    if code != FILE_CODE {
        return Err(ShapefileError::InvalidHeader {
            file,
            reason: format!("file code {} (expected {})", code, FILE_CODE),
        });
    }

    let version = read::i32_le(data, 28, file)?;
    if version != VERSION {
        return Err(ShapefileError::InvalidHeader {
            file,
            reason: format!("version {} (expected {})", version, VERSION),
        });
    }

    let words = read::i32_be(data, 24, file)?;
    let file_length = usize::try_from(words).unwrap_or(0) * 2;

    Ok(ShpHeader {
        file_length,
        shape_type: ShapeType::from_code(read::i32_le(data, 32, file)?)?,
        bbox: [
            read::f64_le(data, 36, file)?,
            read::f64_le(data, 44, file)?,
            read::f64_le(data, 52, file)?,
            read::f64_le(data, 60, file)?,
        ],
    })
}

/// Parse the record whose header starts at `offset`.
pub fn parse_record(data: &[u8], offset: usize) -> ShapefileResult<Geometry> {
    let words = read::i32_be(data, offset + 4, "shp")?;
    let len = usize::try_from(words).unwrap_or(0) * 2;
    let content = read::bytes(data, offset + RECORD_HEADER_LEN, len, "shp")?;
    parse_content(content).map_err(|e| match e {
        // Report positions relative to the whole file.
        ShapefileError::Truncated { file, offset: rel } => ShapefileError::Truncated {
            file,
            offset: offset + RECORD_HEADER_LEN + rel,
        },
        other => other,
    })
}

fn parse_content(content: &[u8]) -> ShapefileResult<Geometry> {
    let shape_type = ShapeType::from_code(read::i32_le(content, 0, "shp")?)?;

    match shape_type {
        ShapeType::Null => Ok(Geometry::Null),
        ShapeType::Point | ShapeType::PointZ | ShapeType::PointM => Ok(Geometry::point(
            read::f64_le(content, 4, "shp")?,
            read::f64_le(content, 12, "shp")?,
        )),
        ShapeType::MultiPoint | ShapeType::MultiPointZ | ShapeType::MultiPointM => {
            // 4..36 is the record bbox
            let num_points = read::count_le(content, 36, "shp")?;
            let points = read_points(content, 40, num_points)?;
            Ok(Geometry::MultiPoint { coordinates: points })
        }
        ShapeType::PolyLine | ShapeType::PolyLineZ | ShapeType::PolyLineM => {
            Ok(Geometry::from_parts(read_parts(content)?))
        }
        ShapeType::Polygon | ShapeType::PolygonZ | ShapeType::PolygonM => {
            Ok(Geometry::from_rings(read_parts(content)?))
        }
    }
}

/// Split the point array of a polyline/polygon record into its parts.
fn read_parts(content: &[u8]) -> ShapefileResult<Vec<Vec<[f64; 2]>>> {
    let num_parts = read::count_le(content, 36, "shp")?;
    let num_points = read::count_le(content, 40, "shp")?;
    read::bytes(content, 44, num_parts.saturating_mul(4), "shp")?;

    let mut starts = Vec::with_capacity(num_parts);
    for i in 0..num_parts {
        starts.push(read::count_le(content, 44 + i * 4, "shp")?);
    }

    let points = read_points(content, 44 + num_parts * 4, num_points)?;

    let mut parts = Vec::with_capacity(num_parts);
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(num_points);
        if start > end || end > num_points {
            return Err(ShapefileError::InvalidHeader {
                file: "shp",
                reason: format!("part {} spans points {}..{} of {}", i, start, end, num_points),
            });
        }
        parts.push(points[start..end].to_vec());
    }

    Ok(parts)
}

fn read_points(content: &[u8], offset: usize, count: usize) -> ShapefileResult<Vec<[f64; 2]>> {
    // Reject counts the buffer cannot hold before allocating.
    read::bytes(content, offset, count.saturating_mul(16), "shp")?;

    let mut points = Vec::with_capacity(count);
    for i in 0..count {
        let at = offset + i * 16;
        points.push([
            read::f64_le(content, at, "shp")?,
            read::f64_le(content, at + 8, "shp")?,
        ]);
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(content: Vec<u8>) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&1i32.to_be_bytes());
        data.extend_from_slice(&((content.len() / 2) as i32).to_be_bytes());
        data.extend_from_slice(&content);
        data
    }

    #[test]
    fn test_shape_type_codes() {
        for code in [0, 1, 3, 5, 8, 11, 13, 15, 18, 21, 23, 25, 28] {
            assert_eq!(ShapeType::from_code(code).unwrap().code(), code);
        }
        assert!(matches!(
            ShapeType::from_code(31),
            Err(ShapefileError::UnsupportedShapeType(31))
        ));
    }

    #[test]
    fn test_point_record() {
        let mut content = Vec::new();
        content.extend_from_slice(&1i32.to_le_bytes());
        content.extend_from_slice(&(-86.5f64).to_le_bytes());
        content.extend_from_slice(&(30.1f64).to_le_bytes());

        let geom = parse_record(&record(content), 0).unwrap();
        assert_eq!(geom, Geometry::point(-86.5, 30.1));
    }

    #[test]
    fn test_null_record() {
        let geom = parse_record(&record(0i32.to_le_bytes().to_vec()), 0).unwrap();
        assert!(geom.is_null());
    }

    #[test]
    fn test_polyline_two_parts() {
        let mut content = Vec::new();
        content.extend_from_slice(&3i32.to_le_bytes());
        content.extend_from_slice(&[0u8; 32]);
        content.extend_from_slice(&2i32.to_le_bytes());
        content.extend_from_slice(&4i32.to_le_bytes());
        content.extend_from_slice(&0i32.to_le_bytes());
        content.extend_from_slice(&2i32.to_le_bytes());
        for v in [0.0f64, 0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0] {
            content.extend_from_slice(&v.to_le_bytes());
        }

        match parse_record(&record(content), 0).unwrap() {
            Geometry::MultiLineString { coordinates } => {
                assert_eq!(coordinates.len(), 2);
                assert_eq!(coordinates[1], vec![[2.0, 2.0], [3.0, 3.0]]);
            }
            other => panic!("expected MultiLineString, got {:?}", other),
        }
    }

    #[test]
    fn test_part_count_beyond_record_is_truncation() {
        let mut content = Vec::new();
        content.extend_from_slice(&5i32.to_le_bytes());
        content.extend_from_slice(&[0u8; 32]);
        content.extend_from_slice(&i32::MAX.to_le_bytes());
        content.extend_from_slice(&0i32.to_le_bytes());

        assert!(matches!(
            parse_record(&record(content), 0),
            Err(ShapefileError::Truncated { .. })
        ));
    }

    #[test]
    fn test_truncated_record_reports_file_offset() {
        let mut content = Vec::new();
        content.extend_from_slice(&1i32.to_le_bytes());
        content.extend_from_slice(&(1.0f64).to_le_bytes());

        let mut data = vec![0u8; 100];
        data.extend(record(content));
        match parse_record(&data, 100) {
            Err(ShapefileError::Truncated { offset, .. }) => assert_eq!(offset, 120),
            other => panic!("expected truncation, got {:?}", other),
        }
    }
}
