//! Joins the component files of one dataset into track records.

use storm_common::{FieldValue, Geometry, TrackRecord};
use tracing::debug;

use crate::dbf::{self, FieldDescriptor};
use crate::error::{ShapefileError, ShapefileResult};
use crate::shp::{self, ShapeType};
use crate::shx;

/// A fully decoded shapefile dataset.
#[derive(Debug, Clone)]
pub struct ShapefileReader {
    shape_type: ShapeType,
    bbox: [f64; 4],
    fields: Vec<FieldDescriptor>,
    shapes: Vec<Geometry>,
    records: Vec<Vec<(String, FieldValue)>>,
}

impl ShapefileReader {
    /// Decode a dataset from its `.shp`, `.shx` and `.dbf` contents.
    pub fn from_bytes(shp_data: &[u8], shx_data: &[u8], dbf_data: &[u8]) -> ShapefileResult<Self> {
        let header = shp::parse_header(shp_data, "shp")?;
        let index = shx::parse_index(shx_data)?;

        let mut shapes = Vec::with_capacity(index.len());
        for entry in &index {
            shapes.push(shp::parse_record(shp_data, entry.offset)?);
        }

        let dbf_header = dbf::parse_header(dbf_data)?;
        let records = dbf::parse_records(dbf_data, &dbf_header)?;

        debug!(
            shape_type = ?header.shape_type,
            shapes = shapes.len(),
            records = records.len(),
            fields = dbf_header.fields.len(),
            "Decoded shapefile"
        );

        Ok(Self {
            shape_type: header.shape_type,
            bbox: header.bbox,
            fields: dbf_header.fields,
            shapes,
            records,
        })
    }

    pub fn shape_type(&self) -> ShapeType {
        self.shape_type
    }

    /// Xmin, Ymin, Xmax, Ymax from the `.shp` header.
    pub fn bbox(&self) -> [f64; 4] {
        self.bbox
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Number of shape records.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn shapes(&self) -> &[Geometry] {
        &self.shapes
    }

    pub fn records(&self) -> &[Vec<(String, FieldValue)>] {
        &self.records
    }

    /// Zip geometries with attribute rows, one record per shape.
    pub fn into_records(self) -> ShapefileResult<Vec<TrackRecord>> {
        if self.shapes.len() != self.records.len() {
            return Err(ShapefileError::RecordCountMismatch {
                shapes: self.shapes.len(),
                records: self.records.len(),
            });
        }

        Ok(self
            .shapes
            .into_iter()
            .zip(self.records)
            .map(|(geometry, attributes)| TrackRecord::new(geometry, attributes))
            .collect())
    }
}

/// Projection WKT from a `.prj`, or `None` when blank.
pub fn read_projection(prj_data: &[u8]) -> Option<String> {
    let wkt = String::from_utf8_lossy(prj_data).trim().to_string();
    if wkt.is_empty() {
        None
    } else {
        Some(wkt)
    }
}
