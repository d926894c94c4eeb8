//! Generators for synthetic shapefile datasets and zip archives.
//!
//! The builders write the same byte layouts the NHC archives use, so tests
//! can exercise the decoder and the extraction path without network access.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// A dBase field definition for [`ShapefileBuilder`].
#[derive(Debug, Clone)]
pub struct DbfField {
    pub name: String,
    pub kind: u8,
    pub length: u8,
    pub decimals: u8,
}

/// The four component files of one dataset.
#[derive(Debug, Clone)]
pub struct ShapefileComponents {
    pub shp: Vec<u8>,
    pub shx: Vec<u8>,
    pub dbf: Vec<u8>,
    pub prj: Vec<u8>,
}

impl ShapefileComponents {
    /// Zip entries named `{stem}.dbf`, `{stem}.prj`, `{stem}.shp`, `{stem}.shx`.
    pub fn zip_entries(&self, stem: &str) -> Vec<(String, Vec<u8>)> {
        vec![
            (format!("{}.dbf", stem), self.dbf.clone()),
            (format!("{}.prj", stem), self.prj.clone()),
            (format!("{}.shp", stem), self.shp.clone()),
            (format!("{}.shx", stem), self.shx.clone()),
        ]
    }
}

/// Builds an in-memory shapefile dataset record by record.
///
/// # Example
///
/// ```
/// use test_utils::ShapefileBuilder;
///
/// let components = ShapefileBuilder::points()
///     .character_field("STORMNAME", 10)
///     .numeric_field("INTENSITY", 4, 0)
///     .add_point(-85.5, 29.0, &["MICHAEL", "140"])
///     .build();
/// assert_eq!(components.shx.len(), 100 + 8);
/// ```
#[derive(Debug, Clone)]
pub struct ShapefileBuilder {
    shape_type: i32,
    contents: Vec<Vec<u8>>,
    points: Vec<[f64; 2]>,
    fields: Vec<DbfField>,
    rows: Vec<Vec<String>>,
    prj: String,
}

impl ShapefileBuilder {
    pub fn new(shape_type: i32) -> Self {
        Self {
            shape_type,
            contents: Vec::new(),
            points: Vec::new(),
            fields: Vec::new(),
            rows: Vec::new(),
            prj: crate::fixtures::WGS84_PRJ.to_string(),
        }
    }

    pub fn points() -> Self {
        Self::new(1)
    }

    pub fn polylines() -> Self {
        Self::new(3)
    }

    pub fn polygons() -> Self {
        Self::new(5)
    }

    pub fn field(mut self, name: &str, kind: u8, length: u8, decimals: u8) -> Self {
        self.fields.push(DbfField {
            name: name.to_string(),
            kind,
            length,
            decimals,
        });
        self
    }

    pub fn character_field(self, name: &str, length: u8) -> Self {
        self.field(name, b'C', length, 0)
    }

    pub fn numeric_field(self, name: &str, length: u8, decimals: u8) -> Self {
        self.field(name, b'N', length, decimals)
    }

    pub fn prj(mut self, wkt: &str) -> Self {
        self.prj = wkt.to_string();
        self
    }

    pub fn add_point(mut self, x: f64, y: f64, values: &[&str]) -> Self {
        let mut content = Vec::with_capacity(20);
        content.extend_from_slice(&1i32.to_le_bytes());
        content.extend_from_slice(&x.to_le_bytes());
        content.extend_from_slice(&y.to_le_bytes());
        self.points.push([x, y]);
        self.push(content, values)
    }

    pub fn add_polyline(self, parts: &[Vec<[f64; 2]>], values: &[&str]) -> Self {
        self.add_multipart(3, parts, values)
    }

    pub fn add_polygon(self, rings: &[Vec<[f64; 2]>], values: &[&str]) -> Self {
        self.add_multipart(5, rings, values)
    }

    fn add_multipart(mut self, shape_type: i32, parts: &[Vec<[f64; 2]>], values: &[&str]) -> Self {
        let all: Vec<[f64; 2]> = parts.iter().flatten().copied().collect();
        let bbox = bbox_of(&all);

        let mut content = Vec::new();
        content.extend_from_slice(&shape_type.to_le_bytes());
        for v in bbox {
            content.extend_from_slice(&v.to_le_bytes());
        }
        content.extend_from_slice(&(parts.len() as i32).to_le_bytes());
        content.extend_from_slice(&(all.len() as i32).to_le_bytes());
        let mut start = 0i32;
        for part in parts {
            content.extend_from_slice(&start.to_le_bytes());
            start += part.len() as i32;
        }
        for [x, y] in &all {
            content.extend_from_slice(&x.to_le_bytes());
            content.extend_from_slice(&y.to_le_bytes());
        }

        self.points.extend(all);
        self.push(content, values)
    }

    fn push(mut self, content: Vec<u8>, values: &[&str]) -> Self {
        self.contents.push(content);
        self.rows.push(values.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn build(&self) -> ShapefileComponents {
        ShapefileComponents {
            shp: self.shp_bytes(),
            shx: self.shx_bytes(),
            dbf: self.dbf_bytes(),
            prj: self.prj.as_bytes().to_vec(),
        }
    }

    pub fn shp_bytes(&self) -> Vec<u8> {
        let total: usize = 100 + self.contents.iter().map(|c| 8 + c.len()).sum::<usize>();
        let mut data = self.header(total);
        for (i, content) in self.contents.iter().enumerate() {
            data.extend_from_slice(&((i + 1) as i32).to_be_bytes());
            data.extend_from_slice(&((content.len() / 2) as i32).to_be_bytes());
            data.extend_from_slice(content);
        }
        data
    }

    pub fn shx_bytes(&self) -> Vec<u8> {
        let mut data = self.header(100 + 8 * self.contents.len());
        let mut offset = 100usize;
        for content in &self.contents {
            data.extend_from_slice(&((offset / 2) as i32).to_be_bytes());
            data.extend_from_slice(&((content.len() / 2) as i32).to_be_bytes());
            offset += 8 + content.len();
        }
        data
    }

    pub fn dbf_bytes(&self) -> Vec<u8> {
        let header_length = 32 + 32 * self.fields.len() + 1;
        let record_length = 1 + self.fields.iter().map(|f| f.length as usize).sum::<usize>();

        let mut data = Vec::new();
        data.push(0x03);
        data.extend_from_slice(&[124, 1, 1]);
        data.extend_from_slice(&(self.rows.len() as u32).to_le_bytes());
        data.extend_from_slice(&(header_length as u16).to_le_bytes());
        data.extend_from_slice(&(record_length as u16).to_le_bytes());
        data.extend_from_slice(&[0u8; 20]);

        for field in &self.fields {
            let mut descriptor = [0u8; 32];
            let name = field.name.as_bytes();
            descriptor[..name.len().min(10)].copy_from_slice(&name[..name.len().min(10)]);
            descriptor[11] = field.kind;
            descriptor[16] = field.length;
            descriptor[17] = field.decimals;
            data.extend_from_slice(&descriptor);
        }
        data.push(0x0D);

        for row in &self.rows {
            data.push(b' ');
            for (i, field) in self.fields.iter().enumerate() {
                let value = row.get(i).map(String::as_str).unwrap_or("");
                let width = field.length as usize;
                let mut value: String = value.chars().take(width).collect();
                if field.kind == b'N' || field.kind == b'F' {
                    value = format!("{:>width$}", value, width = width);
                } else {
                    value = format!("{:<width$}", value, width = width);
                }
                data.extend_from_slice(value.as_bytes());
            }
        }
        data.push(0x1A);
        data
    }

    fn header(&self, file_length: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(100);
        data.extend_from_slice(&9994i32.to_be_bytes());
        data.extend_from_slice(&[0u8; 20]);
        data.extend_from_slice(&((file_length / 2) as i32).to_be_bytes());
        data.extend_from_slice(&1000i32.to_le_bytes());
        data.extend_from_slice(&self.shape_type.to_le_bytes());
        for v in bbox_of(&self.points) {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.extend_from_slice(&[0u8; 32]);
        data
    }
}

fn bbox_of(points: &[[f64; 2]]) -> [f64; 4] {
    if points.is_empty() {
        return [0.0; 4];
    }
    let mut bbox = [f64::MAX, f64::MAX, f64::MIN, f64::MIN];
    for [x, y] in points {
        bbox[0] = bbox[0].min(*x);
        bbox[1] = bbox[1].min(*y);
        bbox[2] = bbox[2].max(*x);
        bbox[3] = bbox[3].max(*y);
    }
    bbox
}

/// Write entries into an in-memory zip archive.
pub fn build_zip(entries: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        writer
            .start_file(name.as_str(), SimpleFileOptions::default())
            .expect("Failed to start zip entry");
        writer.write_all(data).expect("Failed to write zip entry");
    }
    writer
        .finish()
        .expect("Failed to finish zip archive")
        .into_inner()
}

/// A forecast-position style dataset with `rows` points.
///
/// Fields: `STORMNAME` (C10), `ADVISNUM` (N3), `INTENSITY` (N4). Row `i`
/// sits at (-80 - i, 20 + i) with intensity `50 + 10 * i`.
pub fn track_points(storm: &str, advisory: u32, rows: usize) -> ShapefileComponents {
    let mut builder = ShapefileBuilder::points()
        .character_field("STORMNAME", 10)
        .numeric_field("ADVISNUM", 3, 0)
        .numeric_field("INTENSITY", 4, 0);
    for i in 0..rows {
        let advisory = advisory.to_string();
        let intensity = (50 + 10 * i).to_string();
        builder = builder.add_point(
            -80.0 - i as f64,
            20.0 + i as f64,
            &[storm, advisory.as_str(), intensity.as_str()],
        );
    }
    builder.build()
}

/// A probabilistic surge style dataset with `rows` square polygons.
///
/// Field: `PSurge` (N5.1) holding the exceedance probability.
pub fn surge_polygons(rows: usize) -> ShapefileComponents {
    let mut builder = ShapefileBuilder::polygons().numeric_field("PSurge", 5, 1);
    for i in 0..rows {
        let x0 = -90.0 + i as f64;
        let ring = vec![
            [x0, 29.0],
            [x0, 30.0],
            [x0 + 1.0, 30.0],
            [x0 + 1.0, 29.0],
            [x0, 29.0],
        ];
        let probability = format!("{:.1}", 10.0 * (i + 1) as f64);
        builder = builder.add_polygon(&[ring], &[probability.as_str()]);
    }
    builder.build()
}

/// Zip archive holding a single forecast-position dataset named `{stem}`.
pub fn track_archive(stem: &str, storm: &str, advisory: u32, rows: usize) -> Vec<u8> {
    build_zip(&track_points(storm, advisory, rows).zip_entries(stem))
}

/// Zip archive holding a single surge dataset named `{stem}`.
pub fn surge_archive(stem: &str, rows: usize) -> Vec<u8> {
    build_zip(&surge_polygons(rows).zip_entries(stem))
}
